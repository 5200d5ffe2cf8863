//! Parameter shaping: knob + attenuverter × CV → clamped engine value.
//!
//! Every modulated parameter follows the same recipe:
//!
//! ```text
//! effective = clamp(base + curve(depth) · scale · cv / 5 V, lo, hi)
//! ```
//!
//! where `curve` is [`quadratic_bipolar`] for the timbral parameters and
//! [`quartic_bipolar`] for frequency modulation.
//!
//! The sum is evaluated in `f64` and rounded to `f32` once, before
//! clamping. Saved patches depend on these values being reproduced exactly,
//! so keep the operation order when editing.

use annuli_core::{clamp, quadratic_bipolar, quartic_bipolar};
use annuli_platform::REFERENCE_VOLTAGE;
use libm::roundf;

use crate::engine::NUM_CHORDS;

/// Modulation depth at full attenuverter travel, in knob units per 5 V.
pub const MOD_SCALE: f64 = 3.3;

/// Frequency modulation range in semitones.
pub const FM_RANGE: f32 = 48.0;

/// Upper limit for structure, damping and position.
pub const PATCH_CEILING: f32 = 0.9995;

/// Highest coarse transpose in semitones.
pub const MAX_TRANSPOSE: f32 = 60.0;

/// Offset added to the transpose to form the tonic.
pub const TONIC_OFFSET: f32 = 12.0;

/// Pitch input voltage assumed when V/OCT is unpatched (one semitone above 0 V).
pub const DEFAULT_PITCH_VOLTS: f32 = (1.0f64 / 12.0) as f32;

/// Unclamped `base + quadratic_bipolar(depth) · 3.3 · cv / 5`.
///
/// The chord selector reads structure before clamping, so the raw value is
/// exposed separately from [`modulate`].
#[inline]
pub fn modulate_raw(base: f32, depth: f32, cv: f32) -> f32 {
    let offset =
        MOD_SCALE * f64::from(quadratic_bipolar(depth)) * f64::from(cv) / f64::from(REFERENCE_VOLTAGE);
    (f64::from(base) + offset) as f32
}

/// Modulated parameter clamped to `[lo, hi]`.
///
/// # Example
///
/// ```rust
/// use annuli_module::shaper::{PATCH_CEILING, modulate};
///
/// // Fully clockwise attenuverter with +5 V adds 3.3: saturates.
/// assert_eq!(modulate(0.5, 1.0, 5.0, 0.0, PATCH_CEILING), PATCH_CEILING);
/// // No CV: the knob passes through.
/// assert_eq!(modulate(0.25, 1.0, 0.0, 0.0, 1.0), 0.25);
/// ```
#[inline]
pub fn modulate(base: f32, depth: f32, cv: f32, lo: f32, hi: f32) -> f32 {
    clamp(modulate_raw(base, depth, cv), lo, hi)
}

/// Frequency modulation in semitones, clamped to ±[`FM_RANGE`].
///
/// `cv` is the already-normalized FM input (1.0 when unpatched, so the
/// attenuverter alone acts as a fine-tune).
#[inline]
pub fn frequency_modulation(depth: f32, cv: f32) -> f32 {
    let fm = f64::from(FM_RANGE) * MOD_SCALE * f64::from(quartic_bipolar(depth)) * f64::from(cv)
        / f64::from(REFERENCE_VOLTAGE);
    clamp(fm as f32, -FM_RANGE, FM_RANGE)
}

/// Tonic in semitones from the frequency knob.
///
/// With V/OCT patched the knob snaps to whole semitones so the input stays
/// in tune; otherwise it is continuous.
///
/// # Example
///
/// ```rust
/// use annuli_module::shaper::tonic;
///
/// assert_eq!(tonic(30.25, true), 42.0);
/// assert_eq!(tonic(30.25, false), 42.25);
/// assert_eq!(tonic(75.0, false), 72.0);
/// ```
#[inline]
pub fn tonic(frequency: f32, quantize: bool) -> f32 {
    let transpose = if quantize { roundf(frequency) } else { frequency };
    TONIC_OFFSET + clamp(transpose, 0.0, MAX_TRANSPOSE)
}

/// Note in semitones from the (normalized) V/OCT voltage.
#[inline]
pub fn note(pitch_volts: f32) -> f32 {
    (12.0 * f64::from(pitch_volts)) as f32
}

/// Chord index selected by the unclamped structure value.
#[inline]
pub fn chord(structure: f32) -> usize {
    let top = (NUM_CHORDS - 1) as f32;
    clamp(roundf(structure * top), 0.0, top) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cv_passes_knob_through() {
        for &base in &[0.0, 0.3, 0.5, 0.9] {
            assert_eq!(modulate(base, 1.0, 0.0, 0.0, 1.0), base);
        }
    }

    #[test]
    fn test_depth_curve_is_quadratic() {
        // 0.5 depth → 0.25 · 3.3 · 5/5 = 0.825
        let v = modulate_raw(0.0, 0.5, 5.0);
        assert!((v - 0.825).abs() < 1e-6, "got {v}");
        let v = modulate_raw(0.0, -0.5, 5.0);
        assert!((v + 0.825).abs() < 1e-6, "got {v}");
    }

    #[test]
    fn test_saturated_cv_stays_in_bounds() {
        for &cv in &[-1e6, -10.0, 10.0, 1e6, f32::INFINITY, f32::NEG_INFINITY] {
            let v = modulate(0.5, 1.0, cv, 0.0, PATCH_CEILING);
            assert!((0.0..=PATCH_CEILING).contains(&v), "cv {cv} gave {v}");
        }
    }

    #[test]
    fn test_nan_cv_is_clamped() {
        let v = modulate(0.5, 1.0, f32::NAN, 0.0, 1.0);
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn test_fm_range() {
        assert_eq!(frequency_modulation(0.0, 1.0), 0.0);
        assert_eq!(frequency_modulation(1.0, 100.0), FM_RANGE);
        assert_eq!(frequency_modulation(-1.0, 100.0), -FM_RANGE);
        // Unpatched FM input (1.0) at full depth: 48 · 3.3 / 5 = 31.68
        assert!((frequency_modulation(1.0, 1.0) - 31.68).abs() < 1e-4);
    }

    #[test]
    fn test_tonic_clamps_transpose() {
        assert_eq!(tonic(-5.0, false), TONIC_OFFSET);
        assert_eq!(tonic(100.0, true), TONIC_OFFSET + MAX_TRANSPOSE);
    }

    #[test]
    fn test_tonic_rounds_half_away_from_zero() {
        assert_eq!(tonic(30.5, true), 43.0);
        assert_eq!(tonic(30.49, true), 42.0);
    }

    #[test]
    fn test_default_note_is_one_semitone() {
        assert!((note(DEFAULT_PITCH_VOLTS) - 1.0).abs() < 1e-6);
        assert_eq!(note(1.0), 12.0);
    }

    #[test]
    fn test_chord_index() {
        assert_eq!(chord(0.0), 0);
        assert_eq!(chord(0.5), 5);
        assert_eq!(chord(0.9995), 10);
        assert_eq!(chord(1.7), 10);
        assert_eq!(chord(-0.4), 0);
        assert_eq!(chord(0.04), 0);
        assert_eq!(chord(0.06), 1);
    }
}
