//! The fingerprint index: a `Songs` table and a `Fingerprints` multimap,
//! behind one trait so the DSP/matcher code never needs to know whether it's
//! talking to Postgres or to an in-memory stand-in used by tests.

pub mod memory;
pub mod postgres;

use rustc_hash::FxHashMap;

use crate::address::Address;
use crate::error::ShazamError;
use crate::fingerprint::{Couple, Fingerprints};

pub type SongId = u32;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub key: String,
}

impl Song {
    pub fn key_for(title: &str, artist: &str) -> String {
        format!("{title}---{artist}")
    }
}

/// Persists and serves song metadata plus the `address -> Couple` multimap.
///
/// Reads (`get_couples`, `get_song_by_id`, `get_song_by_key`, `total_songs`)
/// are safe to call concurrently. `register_song` must be serializable with
/// respect to itself to honor key uniqueness and monotone ID allocation.
pub trait FingerprintStore: Send + Sync {
    fn register_song(&self, title: &str, artist: &str) -> Result<SongId, ShazamError>;
    fn get_song_by_id(&self, id: SongId) -> Result<Option<Song>, ShazamError>;
    fn get_song_by_key(&self, key: &str) -> Result<Option<Song>, ShazamError>;
    fn delete_song_by_id(&self, id: SongId) -> Result<(), ShazamError>;
    fn total_songs(&self) -> Result<u64, ShazamError>;

    fn store_fingerprints(&self, fingerprints: &Fingerprints) -> Result<(), ShazamError>;

    /// Returns only addresses that exist; missing addresses are absent from
    /// the result map, not present with an empty list.
    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<FxHashMap<Address, Vec<Couple>>, ShazamError>;
}
