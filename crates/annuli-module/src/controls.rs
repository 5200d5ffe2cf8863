//! Panel state read by the module on every tick.
//!
//! Controls are grouped by kind and addressed by name: [`Knobs`] for
//! buttons, knobs and attenuverters, [`Jacks`] for the eight inputs, and
//! [`Outputs`] for the two output jacks.

use annuli_platform::{InputJack, OutputJack};

/// Buttons, knobs and attenuverters.
///
/// Buttons read 0.0 released and 1.0 pressed. Main knobs span `0..=1`
/// except [`frequency`](Self::frequency), which spans `0..=60` semitones.
/// Attenuverters span `-1..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knobs {
    /// Polyphony selector button.
    pub polyphony_button: f32,
    /// Resonator model selector button.
    pub model_button: f32,
    /// Easter-egg toggle button.
    pub easter_egg_button: f32,

    /// Coarse frequency in semitones.
    pub frequency: f32,
    /// Structure.
    pub structure: f32,
    /// Brightness.
    pub brightness: f32,
    /// Damping.
    pub damping: f32,
    /// Position.
    pub position: f32,

    /// Brightness CV attenuverter.
    pub brightness_mod: f32,
    /// Frequency CV attenuverter.
    pub frequency_mod: f32,
    /// Damping CV attenuverter.
    pub damping_mod: f32,
    /// Structure CV attenuverter.
    pub structure_mod: f32,
    /// Position CV attenuverter.
    pub position_mod: f32,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            polyphony_button: 0.0,
            model_button: 0.0,
            easter_egg_button: 0.0,
            frequency: 30.0,
            structure: 0.5,
            brightness: 0.5,
            damping: 0.5,
            position: 0.5,
            brightness_mod: 0.0,
            frequency_mod: 0.0,
            damping_mod: 0.0,
            structure_mod: 0.0,
            position_mod: 0.0,
        }
    }
}

/// Input jacks. All default to unpatched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jacks {
    /// Brightness CV.
    pub brightness_mod: InputJack,
    /// Frequency modulation CV.
    pub frequency_mod: InputJack,
    /// Damping CV.
    pub damping_mod: InputJack,
    /// Structure CV.
    pub structure_mod: InputJack,
    /// Position CV.
    pub position_mod: InputJack,
    /// Strum gate.
    pub strum: InputJack,
    /// V/OCT pitch.
    pub pitch: InputJack,
    /// Audio input to the exciter.
    pub audio: InputJack,
}

/// Output jacks.
///
/// Plugging a cable into only one of them mixes both channels onto it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outputs {
    /// Odd-voice output (main block).
    pub odd: OutputJack,
    /// Even-voice output (auxiliary block).
    pub even: OutputJack,
}

impl Outputs {
    /// Both jacks patched.
    pub const fn stereo() -> Self {
        Self {
            odd: OutputJack::patched(),
            even: OutputJack::patched(),
        }
    }

    /// Only the odd jack patched.
    pub const fn mono() -> Self {
        Self {
            odd: OutputJack::patched(),
            even: OutputJack::unpatched(),
        }
    }

    /// True if each channel has its own cable.
    #[inline]
    pub fn is_split(&self) -> bool {
        self.odd.connected && self.even.connected
    }
}
