//! Radix-2 Cooley-Tukey FFT over double-precision complex samples.
//!
//! Recursive even/odd split over `num_complex::Complex<f64>`, so callers can
//! read `.re` directly when encoding a fingerprint address.

use num_complex::Complex;
use std::f64::consts::PI;

use crate::error::ShazamError;

/// Forward FFT of `N` real samples, `N` a power of two.
///
/// Unnormalized, natural (not bit-reversed) output order. No windowing is
/// applied here; that is the caller's job.
pub fn fft(input: &[f64]) -> Result<Vec<Complex<f64>>, ShazamError> {
    if !input.len().is_power_of_two() {
        return Err(ShazamError::InvalidParameter(format!(
            "fft input length {} is not a power of two",
            input.len()
        )));
    }
    let mut buf: Vec<Complex<f64>> = input.iter().map(|&x| Complex::new(x, 0.0)).collect();
    cooley_tukey(&mut buf);
    Ok(buf)
}

fn cooley_tukey(buf: &mut [Complex<f64>]) {
    let n = buf.len();
    if n <= 1 {
        return;
    }

    let mut even: Vec<Complex<f64>> = Vec::with_capacity(n / 2);
    let mut odd: Vec<Complex<f64>> = Vec::with_capacity(n / 2);
    for (i, &sample) in buf.iter().enumerate() {
        if i % 2 == 0 {
            even.push(sample);
        } else {
            odd.push(sample);
        }
    }

    cooley_tukey(&mut even);
    cooley_tukey(&mut odd);

    for k in 0..n / 2 {
        let theta = -2.0 * PI * (k as f64) / (n as f64);
        let twiddle = Complex::from_polar(1.0, theta) * odd[k];
        buf[k] = even[k] + twiddle;
        buf[k + n / 2] = even[k] - twiddle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_cosine_dominates_its_bin() {
        let n = 8;
        let x: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * (i as f64) / n as f64).cos())
            .collect();
        let out = fft(&x).unwrap();

        assert!((out[1].norm() - 4.0).abs() < 1e-9);
        assert!((out[7].norm() - 4.0).abs() < 1e-9);
        for k in [0, 2, 3, 4, 5, 6] {
            assert!(out[k].norm() <= 1e-9, "bin {k} leaked: {}", out[k].norm());
        }
    }

    #[test]
    fn non_power_of_two_is_rejected() {
        let x = vec![0.0; 6];
        assert!(matches!(fft(&x), Err(ShazamError::InvalidParameter(_))));
    }
}
