//! Mode selection: polyphony, resonator model and the easter-egg flag.
//!
//! Three independent cyclic selectors, each advanced only by its own
//! [`SchmittTrigger`]:
//!
//! | Selector | Positions | Advance |
//! |----------|-----------|---------|
//! | polyphony | 0, 1, 2 (1, 2, 4 voices) | `(p + 1) % 3` |
//! | model | six [`ResonatorModel`]s | `(m + 1) % 3` |
//! | easter egg | off, on | toggle |
//!
//! [`ModeSnapshot`] is the plain value a host saves and restores.
//! [`SharedModeState`] carries it between a control thread and the audio
//! thread without tearing.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use annuli_core::SchmittTrigger;
use annuli_platform::BicolorLight;

use crate::controls::Knobs;
use crate::engine::ResonatorModel;

/// Number of polyphony positions.
pub const POLYPHONY_MODES: u8 = 3;

/// Button thresholds: release below 0, press at 1.
const BUTTON_LOW: f32 = 0.0;
const BUTTON_HIGH: f32 = 1.0;

/// Mode fields as plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSnapshot {
    /// Polyphony position, `0..3`.
    pub polyphony: u8,
    /// Resonator model (or effect index while `easter_egg` is set).
    pub model: ResonatorModel,
    /// Alternate string-synth engine selected.
    pub easter_egg: bool,
}

impl ModeSnapshot {
    /// Voice count for the current polyphony position: `1 << polyphony`.
    #[inline]
    pub const fn voices(&self) -> usize {
        1 << self.polyphony
    }
}

/// Indicator state for the two selector buttons.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lights {
    /// Polyphony indicator.
    pub polyphony: BicolorLight,
    /// Model indicator.
    pub model: BicolorLight,
}

impl Lights {
    /// Lights for a mode.
    pub const fn from_mode(mode: &ModeSnapshot) -> Self {
        Self {
            polyphony: BicolorLight::from_position(mode.polyphony),
            model: BicolorLight::from_position(mode.model.index() % ResonatorModel::BUTTON_CYCLE),
        }
    }
}

/// Which selectors moved during one call to [`ModeSelector::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeChanges {
    /// Polyphony advanced.
    pub polyphony: bool,
    /// Model advanced.
    pub model: bool,
    /// Easter egg toggled.
    pub easter_egg: bool,
}

impl ModeChanges {
    /// True if anything moved.
    #[inline]
    pub fn any(&self) -> bool {
        self.polyphony || self.model || self.easter_egg
    }
}

/// Button-driven mode state machine.
///
/// # Example
///
/// ```rust
/// use annuli_module::{Knobs, ModeSelector, ResonatorModel};
///
/// let mut selector = ModeSelector::new();
/// let mut knobs = Knobs::default();
///
/// // Buttons arm on the first released reading.
/// selector.process(&knobs);
/// knobs.model_button = 1.0;
/// selector.process(&knobs);
/// knobs.model_button = 0.0;
/// selector.process(&knobs);
///
/// assert_eq!(selector.mode().model, ResonatorModel::SympatheticString);
/// ```
#[derive(Debug, Clone)]
pub struct ModeSelector {
    mode: ModeSnapshot,
    polyphony_trigger: SchmittTrigger,
    model_trigger: SchmittTrigger,
    easter_egg_trigger: SchmittTrigger,
}

impl ModeSelector {
    /// Default mode, triggers unarmed.
    pub fn new() -> Self {
        Self {
            mode: ModeSnapshot::default(),
            polyphony_trigger: SchmittTrigger::new(BUTTON_LOW, BUTTON_HIGH),
            model_trigger: SchmittTrigger::new(BUTTON_LOW, BUTTON_HIGH),
            easter_egg_trigger: SchmittTrigger::new(BUTTON_LOW, BUTTON_HIGH),
        }
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> ModeSnapshot {
        self.mode
    }

    /// Replaces the mode, e.g. from saved state.
    ///
    /// A polyphony position outside `0..3` is wrapped into range.
    pub fn set_mode(&mut self, mode: ModeSnapshot) {
        self.mode = ModeSnapshot {
            polyphony: mode.polyphony % POLYPHONY_MODES,
            ..mode
        };
    }

    /// Reads the three buttons and advances any selector whose button was
    /// just pressed.
    pub fn process(&mut self, knobs: &Knobs) -> ModeChanges {
        let mut changes = ModeChanges::default();

        if self.polyphony_trigger.process(knobs.polyphony_button) {
            self.mode.polyphony = (self.mode.polyphony + 1) % POLYPHONY_MODES;
            changes.polyphony = true;
        }
        if self.model_trigger.process(knobs.model_button) {
            self.mode.model = self.mode.model.next_on_button();
            changes.model = true;
        }
        if self.easter_egg_trigger.process(knobs.easter_egg_button) {
            self.mode.easter_egg = !self.mode.easter_egg;
            changes.easter_egg = true;
        }

        #[cfg(feature = "tracing")]
        if changes.any() {
            tracing::debug!(
                polyphony = self.mode.polyphony,
                model = ?self.mode.model,
                easter_egg = self.mode.easter_egg,
                "mode advanced"
            );
        }

        changes
    }

    /// Selects a model directly, bypassing the button cycle.
    pub fn set_model(&mut self, model: ResonatorModel) {
        self.mode.model = model;
    }

    /// Flips the easter-egg flag.
    pub fn toggle_easter_egg(&mut self) {
        self.mode.easter_egg = !self.mode.easter_egg;
    }

    /// Polyphony 0 and the modal model. The easter-egg flag is kept.
    pub fn reset(&mut self) {
        self.mode.polyphony = 0;
        self.mode.model = ResonatorModel::Modal;
    }

    /// Indicator state for the current mode.
    #[inline]
    pub fn lights(&self) -> Lights {
        Lights::from_mode(&self.mode)
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode fields in separate atomics for cross-thread hand-off.
///
/// Each field is a single aligned word, so a reader never sees a half-written
/// value. The three fields are not updated as a unit; a reader racing a
/// writer may see a mix of old and new fields.
///
/// # Example
///
/// ```rust
/// use annuli_module::{ModeSnapshot, ResonatorModel, SharedModeState};
///
/// let shared = SharedModeState::default();
/// shared.store(ModeSnapshot { polyphony: 2, model: ResonatorModel::FmVoice, easter_egg: true });
/// assert_eq!(shared.load().voices(), 4);
/// ```
#[derive(Debug, Default)]
pub struct SharedModeState {
    polyphony: AtomicU8,
    model: AtomicU8,
    easter_egg: AtomicBool,
}

impl SharedModeState {
    /// Starts from `mode`.
    pub fn new(mode: ModeSnapshot) -> Self {
        Self {
            polyphony: AtomicU8::new(mode.polyphony),
            model: AtomicU8::new(mode.model.index()),
            easter_egg: AtomicBool::new(mode.easter_egg),
        }
    }

    /// Publishes `mode`.
    pub fn store(&self, mode: ModeSnapshot) {
        self.polyphony.store(mode.polyphony, Ordering::Relaxed);
        self.model.store(mode.model.index(), Ordering::Relaxed);
        self.easter_egg.store(mode.easter_egg, Ordering::Relaxed);
    }

    /// Captures the current fields.
    pub fn load(&self) -> ModeSnapshot {
        ModeSnapshot {
            polyphony: self.polyphony.load(Ordering::Relaxed) % POLYPHONY_MODES,
            model: ResonatorModel::from_index(self.model.load(Ordering::Relaxed)).unwrap_or_default(),
            easter_egg: self.easter_egg.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(selector: &mut ModeSelector, set: impl Fn(&mut Knobs, f32)) -> ModeChanges {
        let mut knobs = Knobs::default();
        selector.process(&knobs);
        set(&mut knobs, 1.0);
        let changes = selector.process(&knobs);
        set(&mut knobs, 0.0);
        selector.process(&knobs);
        changes
    }

    #[test]
    fn test_polyphony_cycles() {
        let mut selector = ModeSelector::new();
        let voices: [usize; 4] = core::array::from_fn(|_| {
            let v = selector.mode().voices();
            press(&mut selector, |k, v| k.polyphony_button = v);
            v
        });
        assert_eq!(voices, [1, 2, 4, 1]);
    }

    #[test]
    fn test_held_button_advances_once() {
        let mut selector = ModeSelector::new();
        selector.process(&Knobs::default());
        let mut knobs = Knobs {
            model_button: 1.0,
            ..Knobs::default()
        };
        assert!(selector.process(&knobs).model);
        for _ in 0..100 {
            assert!(!selector.process(&knobs).any());
        }
        knobs.model_button = 0.0;
        selector.process(&knobs);
        assert_eq!(selector.mode().model, ResonatorModel::SympatheticString);
    }

    #[test]
    fn test_easter_egg_button_toggles() {
        let mut selector = ModeSelector::new();
        let changes = press(&mut selector, |k, v| k.easter_egg_button = v);
        assert!(changes.easter_egg);
        assert!(selector.mode().easter_egg);
        selector.toggle_easter_egg();
        assert!(!selector.mode().easter_egg);
    }

    #[test]
    fn test_lights_follow_position() {
        let mut selector = ModeSelector::new();
        selector.set_mode(ModeSnapshot {
            polyphony: 1,
            model: ResonatorModel::StringAndReverb,
            easter_egg: false,
        });
        let lights = selector.lights();
        assert_eq!(lights.polyphony, BicolorLight { green: 1.0, red: 1.0 });
        // Model 5 shows as 5 % 3 = 2: red only.
        assert_eq!(lights.model, BicolorLight { green: 0.0, red: 1.0 });
    }

    #[test]
    fn test_reset_keeps_easter_egg() {
        let mut selector = ModeSelector::new();
        selector.set_mode(ModeSnapshot {
            polyphony: 2,
            model: ResonatorModel::FmVoice,
            easter_egg: true,
        });
        selector.reset();
        assert_eq!(
            selector.mode(),
            ModeSnapshot {
                polyphony: 0,
                model: ResonatorModel::Modal,
                easter_egg: true,
            }
        );
    }

    #[test]
    fn test_button_held_at_power_up_does_not_advance() {
        let mut selector = ModeSelector::new();
        let knobs = Knobs {
            polyphony_button: 1.0,
            ..Knobs::default()
        };
        assert!(!selector.process(&knobs).any());
        assert_eq!(selector.mode(), ModeSnapshot::default());
    }

    #[test]
    fn test_set_mode_wraps_polyphony() {
        let mut selector = ModeSelector::new();
        selector.set_mode(ModeSnapshot {
            polyphony: 4,
            ..ModeSnapshot::default()
        });
        assert_eq!(selector.mode().polyphony, 1);
    }

    #[test]
    fn test_shared_state_round_trip() {
        let mode = ModeSnapshot {
            polyphony: 1,
            model: ResonatorModel::SympatheticStringQuantized,
            easter_egg: true,
        };
        let shared = SharedModeState::new(ModeSnapshot::default());
        assert_eq!(shared.load(), ModeSnapshot::default());
        shared.store(mode);
        assert_eq!(shared.load(), mode);
    }
}
