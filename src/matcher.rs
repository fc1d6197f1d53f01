//! Time-offset coherence scoring: joins a query's fingerprint addresses
//! against the store, then counts how many pairs of hits have the same
//! query-side/database-side time gap (within 100ms) — the hallmark of a
//! clip playing at the same tempo as the stored recording.

use rustc_hash::FxHashMap;

use crate::error::ShazamError;
use crate::fingerprint::Fingerprints;
use crate::store::{FingerprintStore, SongId};

const COHERENCE_TOLERANCE_MS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Match {
    pub song_id: SongId,
    pub title: String,
    pub artist: String,
    pub timestamp_ms: u32,
    pub score: usize,
}

pub struct Matcher<'s> {
    store: &'s dyn FingerprintStore,
    max_hits_per_song: Option<usize>,
}

impl<'s> Matcher<'s> {
    pub fn new(store: &'s dyn FingerprintStore) -> Self {
        Self {
            store,
            max_hits_per_song: None,
        }
    }

    /// Caps the number of (query, db) time pairs considered per candidate
    /// song before scoring. The inner loop is O(hits^2); a handful of very
    /// popular anchors can otherwise dominate query latency. Capping does
    /// not change the relative ordering of normal results.
    pub fn with_max_hits_per_song(store: &'s dyn FingerprintStore, max_hits_per_song: usize) -> Self {
        Self {
            store,
            max_hits_per_song: Some(max_hits_per_song),
        }
    }

    pub fn find_matches(&self, query: &Fingerprints) -> Result<Vec<Match>, ShazamError> {
        let addresses: Vec<_> = query.keys().copied().collect();
        let couples = self.store.get_couples(&addresses)?;

        // song_id -> [(query_anchor_ms, db_anchor_ms)]
        let mut hits: FxHashMap<SongId, Vec<(u32, u32)>> = FxHashMap::default();
        for (address, query_couple) in query.iter() {
            let Some(db_couples) = couples.get(address) else {
                continue;
            };
            for db_couple in db_couples {
                let bucket = hits.entry(db_couple.song_id).or_default();
                if let Some(limit) = self.max_hits_per_song {
                    if bucket.len() >= limit {
                        continue;
                    }
                }
                bucket.push((query_couple.anchor_time_ms, db_couple.anchor_time_ms));
            }
        }

        let mut matches = Vec::new();
        for (song_id, times) in hits {
            if times.len() < 2 {
                continue;
            }

            let score = coherence_score(&times);
            if score == 0 {
                continue;
            }

            let Some(song) = self.store.get_song_by_id(song_id)? else {
                continue;
            };
            let timestamp_ms = times.iter().map(|&(_, db)| db).min().unwrap_or(0);

            matches.push(Match {
                song_id,
                title: song.title,
                artist: song.artist,
                timestamp_ms,
                score,
            });
        }

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(matches)
    }
}

fn coherence_score(times: &[(u32, u32)]) -> usize {
    let mut count = 0;
    for i in 0..times.len() {
        for j in i + 1..times.len() {
            let query_diff = (times[i].0 as f64 - times[j].0 as f64).abs();
            let db_diff = (times[i].1 as f64 - times[j].1 as f64).abs();
            if (query_diff - db_diff).abs() < COHERENCE_TOLERANCE_MS {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Couple;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn song_with_fewer_than_two_hits_scores_zero_and_is_skipped() {
        let store = InMemoryStore::new();
        let id = store.register_song("Solo", "Artist").unwrap();
        let mut db_fps = Fingerprints::default();
        db_fps.insert(
            1,
            Couple {
                anchor_time_ms: 100,
                song_id: id,
            },
        );
        store.store_fingerprints(&db_fps).unwrap();

        let mut query = Fingerprints::default();
        query.insert(
            1,
            Couple {
                anchor_time_ms: 0,
                song_id: 999,
            },
        );

        let matcher = Matcher::new(&store);
        let matches = matcher.find_matches(&query).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn aligned_offsets_score_higher_than_misaligned() {
        let store = InMemoryStore::new();
        let id = store.register_song("Song", "Artist").unwrap();

        let mut db_fps = Fingerprints::default();
        for i in 0..6u32 {
            db_fps.insert(
                i,
                Couple {
                    anchor_time_ms: i * 1000,
                    song_id: id,
                },
            );
        }
        store.store_fingerprints(&db_fps).unwrap();

        // Query replays the same song at a constant +500ms offset: every
        // pairwise gap should line up.
        let mut query = Fingerprints::default();
        for i in 0..6u32 {
            query.insert(
                i,
                Couple {
                    anchor_time_ms: i * 1000 + 500,
                    song_id: 0,
                },
            );
        }

        let matcher = Matcher::new(&store);
        let matches = matcher.find_matches(&query).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].song_id, id);
        assert_eq!(matches[0].score, 15); // all 6-choose-2 pairs cohere
    }

    #[test]
    fn missing_song_row_is_skipped_not_errored() {
        let store = InMemoryStore::new();
        let mut db_fps = Fingerprints::default();
        for i in 0..3u32 {
            db_fps.insert(
                i,
                Couple {
                    anchor_time_ms: i * 1000,
                    song_id: 42, // never registered
                },
            );
        }
        store.store_fingerprints(&db_fps).unwrap();

        let mut query = Fingerprints::default();
        for i in 0..3u32 {
            query.insert(
                i,
                Couple {
                    anchor_time_ms: i * 1000,
                    song_id: 0,
                },
            );
        }

        let matcher = Matcher::new(&store);
        assert!(matcher.find_matches(&query).unwrap().is_empty());
    }
}
