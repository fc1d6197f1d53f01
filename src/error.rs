//! Error taxonomy shared across the DSP chain, the fingerprint store, and the
//! outer CLI/server binaries.

/// Everything that can go wrong ingesting or querying a song.
///
/// Internal stages never swallow a failure; they return one of these and let
/// the caller decide policy (the matcher is the one exception: a missing or
/// stale `Song` row is a skip, not an error, see `matcher`).
#[derive(Debug, thiserror::Error)]
pub enum ShazamError {
    #[error("failed to decode audio: {0}")]
    DecodeFailure(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("song already registered under key {0:?}")]
    DuplicateKey(String),

    #[error("fingerprint store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("no spectrogram/peaks for input (too short)")]
    EmptyResult,
}
