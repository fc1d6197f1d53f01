//! Composes the ingest and query flows: decode hand-off → DSP chain →
//! fingerprinting → store/matcher.

use rand::Rng;

use crate::dsp::spectrogram::spectrogram;
use crate::error::ShazamError;
use crate::fingerprint::fingerprint;
use crate::matcher::{Match, Matcher};
use crate::peaks::extract_peaks;
use crate::store::{FingerprintStore, SongId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub song_id: SongId,
    pub fingerprint_count: usize,
}

/// Fingerprints `samples` and registers them under a fresh song. Rejects
/// clips too short to yield any fingerprints with `EmptyResult` before
/// touching the store, and rolls the song registration back if storing the
/// fingerprints fails.
pub fn ingest(
    store: &dyn FingerprintStore,
    samples: &[f64],
    sample_rate: u32,
    duration_seconds: f64,
    title: &str,
    artist: &str,
) -> Result<IngestReport, ShazamError> {
    let fingerprints = fingerprints_for(samples, sample_rate, duration_seconds, 0)?;
    if fingerprints.is_empty() {
        return Err(ShazamError::EmptyResult);
    }

    let song_id = store.register_song(title, artist)?;
    let fingerprints = retag(fingerprints, song_id);

    if let Err(err) = store.store_fingerprints(&fingerprints) {
        let _ = store.delete_song_by_id(song_id);
        return Err(err);
    }

    Ok(IngestReport {
        song_id,
        fingerprint_count: fingerprints.len(),
    })
}

/// Fingerprints `samples` with a throwaway song ID (the matcher never reads
/// it) and ranks candidates from `store`.
pub fn query(
    store: &dyn FingerprintStore,
    samples: &[f64],
    sample_rate: u32,
    duration_seconds: f64,
) -> Result<Vec<Match>, ShazamError> {
    let throwaway_id: u32 = rand::rng().random_range(1..=u32::MAX);
    let fingerprints = fingerprints_for(samples, sample_rate, duration_seconds, throwaway_id)?;

    Matcher::new(store).find_matches(&fingerprints)
}

fn fingerprints_for(
    samples: &[f64],
    sample_rate: u32,
    duration_seconds: f64,
    song_id: SongId,
) -> Result<crate::fingerprint::Fingerprints, ShazamError> {
    let spectrogram = spectrogram(samples, sample_rate)?;
    let peaks = extract_peaks(&spectrogram, duration_seconds);
    Ok(fingerprint(&peaks, song_id))
}

fn retag(
    fingerprints: crate::fingerprint::Fingerprints,
    song_id: SongId,
) -> crate::fingerprint::Fingerprints {
    fingerprints
        .into_iter()
        .map(|(address, couple)| {
            (
                address,
                crate::fingerprint::Couple {
                    anchor_time_ms: couple.anchor_time_ms,
                    song_id,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use std::f64::consts::PI;

    fn sine_wave(freq_hz: f64, sample_rate: u32, seconds: f64) -> Vec<f64> {
        let n = (sample_rate as f64 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn too_short_clip_yields_empty_matches_without_panicking() {
        let store = InMemoryStore::new();
        let samples = vec![0.0; 10];
        let matches = query(&store, &samples, 44_100, 10.0 / 44_100.0).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn ingesting_a_too_short_clip_is_rejected_and_nothing_is_registered() {
        let store = InMemoryStore::new();
        let samples = vec![0.0; 10];
        let err = ingest(&store, &samples, 44_100, 10.0 / 44_100.0, "Title", "Artist").unwrap_err();
        assert!(matches!(err, ShazamError::EmptyResult));
        assert_eq!(store.total_songs().unwrap(), 0);
    }

    #[test]
    fn ingested_song_is_the_top_match_for_its_own_audio() {
        let store = InMemoryStore::new();
        let sample_rate = 44_100;
        let samples = sine_wave(440.0, sample_rate, 10.0);
        let duration = samples.len() as f64 / sample_rate as f64;

        let report = ingest(&store, &samples, sample_rate, duration, "Title", "Artist").unwrap();
        assert!(report.fingerprint_count > 0);

        let noise = sine_wave(880.0, sample_rate, 6.0);
        let noise_duration = noise.len() as f64 / sample_rate as f64;
        ingest(&store, &noise, sample_rate, noise_duration, "Other", "Artist").unwrap();

        let matches = query(&store, &samples, sample_rate, duration).unwrap();
        assert!(!matches.is_empty());
        assert_eq!(matches[0].song_id, report.song_id);
        if matches.len() > 1 {
            assert!(matches[0].score > matches[1].score);
        }
    }

    #[test]
    fn prefix_clip_still_matches_near_the_original_offset() {
        let store = InMemoryStore::new();
        let sample_rate = 44_100;
        let samples = sine_wave(440.0, sample_rate, 10.0);
        let duration = samples.len() as f64 / sample_rate as f64;
        let report = ingest(&store, &samples, sample_rate, duration, "Title", "Artist").unwrap();

        let prefix_len = sample_rate as usize * 5;
        let prefix = &samples[..prefix_len];
        let prefix_duration = prefix.len() as f64 / sample_rate as f64;

        let matches = query(&store, prefix, sample_rate, prefix_duration).unwrap();
        assert!(!matches.is_empty());
        assert_eq!(matches[0].song_id, report.song_id);
        assert!(matches[0].timestamp_ms < 500);
    }
}
