//! Small numeric helpers shared by the control and audio paths.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Response Curves
//!
//! Attenuverter knobs (-1..1) feel better with a curve that is gentle near
//! the centre detent and steep at the extremes. Both curves are odd, so a
//! knob turned left mirrors the same amount turned right:
//!
//! | Function | Shape | Used for |
//! |----------|-------|----------|
//! | [`quadratic_bipolar`] | `sign(x)·x²` | timbre modulation depth |
//! | [`quartic_bipolar`] | `sign(x)·x⁴` | frequency modulation depth |
//!
//! # Utilities
//!
//! - [`clamp`] - NaN-safe range limiting
//! - [`lerp`] - Linear interpolation
//! - [`semitones_to_ratio`] - Pitch offset to frequency ratio
//! - [`flush_denormal`] - Subnormal suppression for feedback paths

use libm::exp2f;

/// Odd quadratic response: `x²` carrying the sign of `x`.
///
/// # Example
/// ```rust
/// use annuli_core::quadratic_bipolar;
///
/// assert_eq!(quadratic_bipolar(0.5), 0.25);
/// assert_eq!(quadratic_bipolar(-0.5), -0.25);
/// ```
#[inline]
pub fn quadratic_bipolar(x: f32) -> f32 {
    let x2 = x * x;
    if x >= 0.0 { x2 } else { -x2 }
}

/// Odd quartic response: `x⁴` carrying the sign of `x`.
///
/// # Example
/// ```rust
/// use annuli_core::quartic_bipolar;
///
/// assert_eq!(quartic_bipolar(0.5), 0.0625);
/// assert_eq!(quartic_bipolar(-0.5), -0.0625);
/// ```
#[inline]
pub fn quartic_bipolar(x: f32) -> f32 {
    let x2 = x * x;
    let x4 = x2 * x2;
    if x >= 0.0 { x4 } else { -x4 }
}

/// Clamp a value to `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics and maps NaN to `max`, so a
/// corrupt control value cannot reach the engine.
#[inline]
pub fn clamp(x: f32, min: f32, max: f32) -> f32 {
    x.min(max).max(min)
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert a pitch offset in semitones to a frequency ratio.
///
/// # Example
/// ```rust
/// use annuli_core::semitones_to_ratio;
///
/// assert!((semitones_to_ratio(12.0) - 2.0).abs() < 1e-6);
/// assert!((semitones_to_ratio(-12.0) - 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    exp2f(semitones / 12.0)
}

/// Flush subnormal floats to zero.
///
/// Use this in feedback loops (string delay lines, echo tails) where the
/// signal can decay indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
