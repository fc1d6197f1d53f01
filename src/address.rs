//! 32-bit fingerprint address: anchor-freq-bin (9 bits) ‖ target-freq-bin
//! (9 bits) ‖ Δt-ms (14 bits).
//!
//! `anchor_freq_bin`/`target_freq_bin` are `int(re(freq))` — the real part
//! of the STFT coefficient truncated to an integer — deliberately *not* the
//! band winner's bin index. Two recordings of the same song only collide on
//! the same addresses if both sides of the pipeline compute them the same
//! way, so this stays as-is rather than switching to the bin index. See
//! DESIGN.md's Open Questions entry.

use crate::peaks::Peak;

pub const ANCHOR_BITS: u32 = 9;
pub const TARGET_BITS: u32 = 9;
pub const DELTA_BITS: u32 = 14;

pub type Address = u32;

pub fn encode(anchor: &Peak, target: &Peak) -> Address {
    let anchor_freq_bin = anchor.freq.re as i64 as u32;
    let target_freq_bin = target.freq.re as i64 as u32;
    let delta_ms = ((target.time_seconds - anchor.time_seconds) * 1000.0) as u32;

    (anchor_freq_bin << (DELTA_BITS + TARGET_BITS)) | (target_freq_bin << DELTA_BITS) | delta_ms
}

/// Splits an address back into `(anchor_freq_bin, target_freq_bin, delta_ms)`.
pub fn decode(address: Address) -> (u32, u32, u32) {
    let delta_mask = (1u32 << DELTA_BITS) - 1;
    let target_mask = (1u32 << TARGET_BITS) - 1;

    let delta_ms = address & delta_mask;
    let target_freq_bin = (address >> DELTA_BITS) & target_mask;
    let anchor_freq_bin = address >> (DELTA_BITS + TARGET_BITS);

    (anchor_freq_bin, target_freq_bin, delta_ms)
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
    fn matches_the_worked_example() {
        let anchor = peak_at(0.0, 300.0);
        let target = peak_at(1.25, 301.0);
        let address = encode(&anchor, &target);
        assert_eq!(address, (300u32 << 23) | (301u32 << 14) | 1250u32);
    }

    #[test]
    fn round_trips_within_field_widths() {
        let anchor = peak_at(2.0, 511.0);
        let target = peak_at(5.9, 0.0);
        let address = encode(&anchor, &target);
        let (a, t, d) = decode(address);
        assert_eq!(a, 511);
        assert_eq!(t, 0);
        assert_eq!(d, 3900);
    }
}
