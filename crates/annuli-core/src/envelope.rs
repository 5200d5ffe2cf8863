//! Peak envelope follower.
//!
//! Tracks the rectified amplitude of a signal with separate attack and
//! release time constants. The strummer runs a fast and a slow follower on
//! the exciter input and compares them to spot transients.

use libm::expf;

/// Attack/release envelope follower.
///
/// # Example
///
/// ```rust
/// use annuli_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 50.0);
/// for _ in 0..480 {
///     env.process(1.0);
/// }
/// assert!(env.level() > 0.9);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl EnvelopeFollower {
    /// Creates a follower with the given attack and release times.
    ///
    /// Times are floored at 0.01 ms so the coefficients stay finite.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            envelope: 0.0,
            attack_coeff: coefficient(sample_rate, attack_ms),
            release_coeff: coefficient(sample_rate, release_ms),
        }
    }

    /// Feeds one sample and returns the updated envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        // y[n] = c·y[n-1] + (1 - c)·|x[n]|
        self.envelope = coeff * self.envelope + (1.0 - coeff) * rectified;
        self.envelope
    }

    /// Current envelope without advancing.
    #[inline]
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drops the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

fn coefficient(sample_rate: f32, time_ms: f32) -> f32 {
    expf(-1.0 / (time_ms.max(0.01) * sample_rate / 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_rises() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
        let mut level = 0.0;
        for _ in 0..500 {
            level = env.process(1.0);
        }
        assert!(level > 0.9, "envelope should rise, got {level}");
    }

    #[test]
    fn test_release_falls() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        for _ in 0..500 {
            env.process(1.0);
        }
        let mut level = 1.0;
        for _ in 0..1000 {
            level = env.process(0.0);
        }
        // ~2 time constants: e^-2 ≈ 0.135
        assert!(level < 0.15, "envelope should fall, got {level}");
    }

    #[test]
    fn test_negative_input_is_rectified() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        assert!(env.process(-0.5) > 0.0);
    }

    #[test]
    fn test_reset() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        env.process(1.0);
        env.reset();
        assert_eq!(env.level(), 0.0);
    }
}
