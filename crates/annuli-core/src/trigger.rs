//! Hysteresis edge detector for buttons and gate/trigger inputs.
//!
//! A [`SchmittTrigger`] fires once when its input rises to the high
//! threshold, then stays quiet until the input falls back to the low
//! threshold. The gap between the two thresholds keeps a slowly moving or
//! noisy control from chattering around a single level.
//!
//! ```text
//!  high ─────────╱‾‾‾‾╲────────╱‾‾‾‾
//!  low  ────────╱──────╲──────╱─────
//!              ↑ fire   re-arm ↑ fire
//! ```

/// Arming state of a [`SchmittTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    /// No sample seen at either threshold yet.
    #[default]
    Unknown,
    /// Input last sat at or below the low threshold; the next rise fires.
    Low,
    /// Input last reached the high threshold; waiting to re-arm.
    High,
}

/// Rising-edge detector with separate low/high thresholds.
///
/// A fresh trigger starts in [`TriggerState::Unknown`]: an input that is
/// already high on the first sample settles the state without firing, so
/// a button held down at power-up does not register as a press.
///
/// # Example
///
/// ```rust
/// use annuli_core::SchmittTrigger;
///
/// let mut trig = SchmittTrigger::new(0.0, 1.0);
/// assert!(!trig.process(0.0));  // arm
/// assert!(trig.process(1.0));   // fire
/// assert!(!trig.process(1.0));  // held: no re-trigger
/// assert!(!trig.process(0.5));  // between thresholds: still held
/// assert!(!trig.process(0.0));  // re-arm
/// assert!(trig.process(2.0));   // fire again
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchmittTrigger {
    low: f32,
    high: f32,
    state: TriggerState,
}

impl SchmittTrigger {
    /// Creates a trigger with the given thresholds.
    pub const fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            state: TriggerState::Unknown,
        }
    }

    /// Replaces the thresholds, keeping the current state.
    pub fn set_thresholds(&mut self, low: f32, high: f32) {
        self.low = low;
        self.high = high;
    }

    /// Low (re-arm) threshold.
    #[inline]
    pub fn low(&self) -> f32 {
        self.low
    }

    /// High (fire) threshold.
    #[inline]
    pub fn high(&self) -> f32 {
        self.high
    }

    /// Current arming state.
    #[inline]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// True if the next rise to the high threshold will fire.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state == TriggerState::Low
    }

    /// Feeds one sample; returns `true` on the sample that fires.
    #[inline]
    pub fn process(&mut self, value: f32) -> bool {
        match self.state {
            TriggerState::Low => {
                if value >= self.high {
                    self.state = TriggerState::High;
                    return true;
                }
            }
            TriggerState::High => {
                if value <= self.low {
                    self.state = TriggerState::Low;
                }
            }
            TriggerState::Unknown => {
                if value >= self.high {
                    self.state = TriggerState::High;
                } else if value <= self.low {
                    self.state = TriggerState::Low;
                }
            }
        }
        false
    }

    /// Forgets the arming state.
    pub fn reset(&mut self) {
        self.state = TriggerState::Unknown;
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
