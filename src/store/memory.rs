//! `Mutex`-guarded in-memory backing. This is what the unit/integration
//! tests exercise, and it's useful standalone for embedding the engine in a
//! process that doesn't want a Postgres dependency at all.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use super::{FingerprintStore, Song, SongId};
use crate::address::Address;
use crate::error::ShazamError;
use crate::fingerprint::{Couple, Fingerprints};

#[derive(Default)]
struct Inner {
    songs: FxHashMap<SongId, Song>,
    keys: FxHashMap<String, SongId>,
    fingerprints: FxHashMap<Address, Vec<Couple>>,
    next_id: SongId,
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }
}

impl FingerprintStore for InMemoryStore {
    fn register_song(&self, title: &str, artist: &str) -> Result<SongId, ShazamError> {
        let key = Song::key_for(title, artist);
        let mut inner = self.inner.lock().unwrap();
        if inner.keys.contains_key(&key) {
            return Err(ShazamError::DuplicateKey(key));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.keys.insert(key.clone(), id);
        inner.songs.insert(
            id,
            Song {
                id,
                title: title.to_string(),
                artist: artist.to_string(),
                key,
            },
        );
        Ok(id)
    }

    fn get_song_by_id(&self, id: SongId) -> Result<Option<Song>, ShazamError> {
        Ok(self.inner.lock().unwrap().songs.get(&id).cloned())
    }

    fn get_song_by_key(&self, key: &str) -> Result<Option<Song>, ShazamError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .keys
            .get(key)
            .and_then(|id| inner.songs.get(id))
            .cloned())
    }

    fn delete_song_by_id(&self, id: SongId) -> Result<(), ShazamError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(song) = inner.songs.remove(&id) {
            inner.keys.remove(&song.key);
        }
        Ok(())
    }

    fn total_songs(&self) -> Result<u64, ShazamError> {
        Ok(self.inner.lock().unwrap().songs.len() as u64)
    }

    fn store_fingerprints(&self, fingerprints: &Fingerprints) -> Result<(), ShazamError> {
        let mut inner = self.inner.lock().unwrap();
        for (&address, &couple) in fingerprints.iter() {
            inner.fingerprints.entry(address).or_default().push(couple);
        }
        Ok(())
    }

    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<FxHashMap<Address, Vec<Couple>>, ShazamError> {
        let inner = self.inner.lock().unwrap();
        let mut out = FxHashMap::default();
        for &address in addresses {
            if let Some(couples) = inner.fingerprints.get(&address) {
                out.insert(address, couples.clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_is_rejected_and_total_songs_stays_one() {
        let store = InMemoryStore::new();
        let first = store.register_song("Title", "Artist").unwrap();
        assert_eq!(first, 1);

        let err = store.register_song("Title", "Artist").unwrap_err();
        assert!(matches!(err, ShazamError::DuplicateKey(_)));
        assert_eq!(store.total_songs().unwrap(), 1);
    }

    #[test]
    fn store_then_get_couples_round_trips() {
        let store = InMemoryStore::new();
        let mut fps = Fingerprints::default();
        fps.insert(
            42,
            Couple {
                anchor_time_ms: 1000,
                song_id: 1,
            },
        );
        fps.insert(
            43,
            Couple {
                anchor_time_ms: 2000,
                song_id: 1,
            },
        );
        store.store_fingerprints(&fps).unwrap();

        let got = store.get_couples(&[42, 43, 999]).unwrap();
        assert_eq!(got.len(), 2);
        assert!(!got.contains_key(&999));
        assert_eq!(got[&42][0].anchor_time_ms, 1000);
    }

    #[test]
    fn delete_song_does_not_touch_fingerprints() {
        let store = InMemoryStore::new();
        let id = store.register_song("A", "B").unwrap();
        let mut fps = Fingerprints::default();
        fps.insert(
            1,
            Couple {
                anchor_time_ms: 0,
                song_id: id,
            },
        );
        store.store_fingerprints(&fps).unwrap();

        store.delete_song_by_id(id).unwrap();

        assert!(store.get_song_by_id(id).unwrap().is_none());
        assert_eq!(store.get_couples(&[1]).unwrap().len(), 1);
    }
}
