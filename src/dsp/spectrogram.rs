//! Low-pass → downsample → windowed STFT.
//!
//! Frame count uses stride `downsampled_len / (FREQ_BIN_SIZE - HOP_SIZE)`
//! rather than `downsampled_len / HOP_SIZE`; see the module-level note in
//! `crate::peaks` for why that stride must not change on its own.

use num_complex::Complex;
use rayon::prelude::*;
use std::f64::consts::PI;

use crate::dsp::downsample::downsample;
use crate::dsp::fft::fft;
use crate::dsp::filter::LowPassFilter;
use crate::error::ShazamError;

pub const DSP_RATIO: u32 = 4;
pub const FREQ_BIN_SIZE: usize = 1024;
pub const MAX_FREQ: f64 = 5000.0;
pub const HOP_SIZE: usize = FREQ_BIN_SIZE / 32;

pub type Spectrogram = Vec<Vec<Complex<f64>>>;

pub fn spectrogram(samples: &[f64], sample_rate: u32) -> Result<Spectrogram, ShazamError> {
    let mut lpf = LowPassFilter::new(MAX_FREQ, sample_rate as f64);
    let filtered = lpf.filter(samples);

    let target_rate = sample_rate / DSP_RATIO;
    let downsampled = downsample(&filtered, sample_rate, target_rate)?;

    let num_windows = downsampled.len() / (FREQ_BIN_SIZE - HOP_SIZE);
    if num_windows == 0 {
        return Ok(Vec::new());
    }

    let window = hamming_window(FREQ_BIN_SIZE);

    (0..num_windows)
        .into_par_iter()
        .map(|i| {
            let start = i * HOP_SIZE;
            let end = (start + FREQ_BIN_SIZE).min(downsampled.len());

            let mut bin = vec![0.0f64; FREQ_BIN_SIZE];
            bin[..end - start].copy_from_slice(&downsampled[start..end]);
            for (j, w) in window.iter().enumerate() {
                bin[j] *= w;
            }

            fft(&bin)
        })
        .collect()
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_is_deterministic_for_fixed_len_and_rate() {
        let sr = 44_100u32;
        let samples = vec![0.0f64; sr as usize * 2];
        let a = spectrogram(&samples, sr).unwrap();
        let b = spectrogram(&samples, sr).unwrap();
        assert_eq!(a.len(), b.len());
        assert!(!a.is_empty());
        for frame in &a {
            assert_eq!(frame.len(), FREQ_BIN_SIZE);
        }
    }

    #[test]
    fn too_short_input_yields_zero_frames_not_a_panic() {
        let sr = 44_100u32;
        let samples = vec![0.0f64; 10];
        let spec = spectrogram(&samples, sr).unwrap();
        assert!(spec.is_empty());
    }
}
