//! Acoustic-fingerprint song recognition: the DSP chain (low-pass filter →
//! downsample → STFT → peak extraction), the 32-bit address encoding, the
//! fingerprint index contract, and the time-offset coherence matcher.
//!
//! Decoding a file into PCM and persisting fingerprints to a concrete
//! backend live in [`decode`] and [`store`] respectively; everything above
//! them is pure and synchronous.

pub mod address;
pub mod config;
pub mod decode;
pub mod dsp;
pub mod error;
pub mod fingerprint;
pub mod matcher;
pub mod peaks;
pub mod pipeline;
pub mod schema;
pub mod store;

pub use error::ShazamError;
pub use matcher::Match;
pub use pipeline::{ingest, query, IngestReport};
pub use store::{FingerprintStore, Song, SongId};
