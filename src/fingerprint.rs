//! Anchor/target pairing: each peak is paired with the `TARGET_ZONE_SIZE`
//! peaks immediately following it, producing one fingerprint row per pair.

use rustc_hash::FxHashMap;

use crate::address::{self, Address};
use crate::peaks::Peak;

pub const TARGET_ZONE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Couple {
    pub anchor_time_ms: u32,
    pub song_id: u32,
}

pub type Fingerprints = FxHashMap<Address, Couple>;

/// Builds the fingerprint map for one track. Colliding addresses within the
/// same track overwrite: the last emitted couple wins.
pub fn fingerprint(peaks: &[Peak], song_id: u32) -> Fingerprints {
    let mut out = FxHashMap::default();

    for i in 0..peaks.len() {
        let anchor = &peaks[i];
        let zone_end = (i + TARGET_ZONE_SIZE).min(peaks.len() - 1);
        if zone_end <= i {
            continue;
        }
        for target in &peaks[i + 1..=zone_end] {
            let addr = address::encode(anchor, target);
            let anchor_time_ms = (anchor.time_seconds * 1000.0).floor() as u32;
            out.insert(
                addr,
                Couple {
                    anchor_time_ms,
                    song_id,
                },
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    fn peak_at(time_seconds: f64, freq_re: f64) -> Peak {
        Peak {
            time_seconds,
            freq: Complex::new(freq_re, 0.0),
        }
    }

    #[test]
    fn bounded_by_peaks_times_target_zone_size() {
        let peaks: Vec<Peak> = (0..20)
            .map(|i| peak_at(i as f64 * 0.05, 100.0 + i as f64))
            .collect();
        let fps = fingerprint(&peaks, 7);
        assert!(fps.len() <= peaks.len() * TARGET_ZONE_SIZE);
    }

    #[test]
    fn empty_peaks_yield_no_fingerprints() {
        assert!(fingerprint(&[], 1).is_empty());
    }

    #[test]
    fn single_peak_yields_no_fingerprints() {
        let peaks = vec![peak_at(0.0, 300.0)];
        assert!(fingerprint(&peaks, 1).is_empty());
    }
}
