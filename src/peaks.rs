//! Per-band peak extraction: one loudest bin per frequency band per frame,
//! kept only if it beats the frame's own six-band average magnitude.
//!
//! Taking one winner per band enforces a rough log-frequency tiling so loud
//! low-frequency energy can't drown the upper bands; the "above mean" test
//! is a cheap adaptive threshold that stays robust across differences in
//! overall recording volume.
//!
//! `dsp::spectrogram` counts windows using stride `FREQ_BIN_SIZE - HOP_SIZE`
//! rather than `HOP_SIZE`; `peak_time` below derives `bin_duration` from that
//! same frame count (`bin_duration = audio_duration / frame_count`), so the
//! two must stay in lockstep or every peak's reported time shifts.

use num_complex::Complex;

use crate::dsp::spectrogram::Spectrogram;

const BANDS: [(usize, usize); 6] = [(0, 10), (10, 20), (20, 40), (40, 80), (80, 160), (160, 512)];

#[derive(Debug, Clone, Copy)]
pub struct Peak {
    pub time_seconds: f64,
    pub freq: Complex<f64>,
}

pub fn extract_peaks(spectrogram: &Spectrogram, audio_duration_seconds: f64) -> Vec<Peak> {
    if spectrogram.is_empty() {
        return Vec::new();
    }

    let bin_duration = audio_duration_seconds / spectrogram.len() as f64;
    let mut peaks = Vec::new();

    for (frame_idx, frame) in spectrogram.iter().enumerate() {
        let mut max_mags = [0.0f64; 6];
        let mut max_freqs = [Complex::new(0.0, 0.0); 6];
        let mut max_bins = [0usize; 6];

        for (band_idx, &(lo, hi)) in BANDS.iter().enumerate() {
            let mut best_mag = 0.0;
            let mut best_freq = Complex::new(0.0, 0.0);
            let mut best_bin = lo;

            for k in lo..hi.min(frame.len()) {
                let mag = frame[k].norm();
                if mag > best_mag {
                    best_mag = mag;
                    best_freq = frame[k];
                    best_bin = k;
                }
            }

            max_mags[band_idx] = best_mag;
            max_freqs[band_idx] = best_freq;
            max_bins[band_idx] = best_bin;
        }

        let avg = max_mags.iter().sum::<f64>() / max_mags.len() as f64;

        for band_idx in 0..max_mags.len() {
            if max_mags[band_idx] > avg {
                let peak_time_in_frame =
                    max_bins[band_idx] as f64 * bin_duration / frame.len() as f64;
                let peak_time = frame_idx as f64 * bin_duration + peak_time_in_frame;
                peaks.push(Peak {
                    time_seconds: peak_time,
                    freq: max_freqs[band_idx],
                });
            }
        }
    }

    peaks
}
