//! Synthesis engine boundary.
//!
//! The module never synthesizes sound itself. Once per block it hands a
//! [`PerformanceState`], a [`Patch`] and [`BLOCK_SIZE`] input samples to one
//! of two engines and gets back a main and an auxiliary block:
//!
//! - [`Resonator`] - the normal path, selected by [`ResonatorModel`]
//! - [`StringSynth`] - the alternate path used while the easter-egg flag is
//!   set, selected by [`FxType`]
//!
//! Both engines run at [`ENGINE_SAMPLE_RATE`] and share one reverb scratch
//! arena that the module owns and lends on every call. Only one engine runs
//! per block, so the arena is never aliased.

/// Engine sample rate in Hz.
pub const ENGINE_SAMPLE_RATE: f32 = 48000.0;

/// Samples per engine block.
pub const BLOCK_SIZE: usize = 24;

/// Minimum length of the reverb scratch arena, in `u16` elements.
pub const REVERB_BUFFER_SIZE: usize = 32768;

/// Number of chord shapes selectable through the structure parameter.
pub const NUM_CHORDS: usize = 11;

/// Largest voice count the polyphony selector can request.
pub const MAX_POLYPHONY: usize = 4;

/// Resonator model used by the [`Resonator`] engine.
///
/// The front-panel button cycles through the first three; all six can be
/// selected directly or restored from saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ResonatorModel {
    /// Modal resonator.
    #[default]
    Modal = 0,
    /// Sympathetic strings.
    SympatheticString = 1,
    /// Modulated/inharmonic string.
    String = 2,
    /// Two-operator FM voice.
    FmVoice = 3,
    /// Sympathetic strings tuned to a quantized chord.
    SympatheticStringQuantized = 4,
    /// String followed by reverb.
    StringAndReverb = 5,
}

impl ResonatorModel {
    /// Every model, in index order.
    pub const ALL: [Self; 6] = [
        Self::Modal,
        Self::SympatheticString,
        Self::String,
        Self::FmVoice,
        Self::SympatheticStringQuantized,
        Self::StringAndReverb,
    ];

    /// Number of models reachable from the panel button.
    pub const BUTTON_CYCLE: u8 = 3;

    /// Index used in saved state.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Model at `index`, if it exists.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Modal),
            1 => Some(Self::SympatheticString),
            2 => Some(Self::String),
            3 => Some(Self::FmVoice),
            4 => Some(Self::SympatheticStringQuantized),
            5 => Some(Self::StringAndReverb),
            _ => None,
        }
    }

    /// The model one button press later: `(index + 1) % 3`.
    ///
    /// Pressing from one of the last three models lands back in the first
    /// three.
    #[inline]
    pub const fn next_on_button(self) -> Self {
        match (self.index() + 1) % Self::BUTTON_CYCLE {
            0 => Self::Modal,
            1 => Self::SympatheticString,
            _ => Self::String,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Modal => "Modal resonator",
            Self::SympatheticString => "Sympathetic strings",
            Self::String => "Modulated/inharmonic string",
            Self::FmVoice => "FM voice",
            Self::SympatheticStringQuantized => "Quantized sympathetic strings",
            Self::StringAndReverb => "Reverb string",
        }
    }
}

impl TryFrom<i64> for ResonatorModel {
    type Error = i64;

    /// Converts a saved-state index, returning the rejected value on failure.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::from_index)
            .ok_or(value)
    }
}

/// Effect type used by the [`StringSynth`] engine.
///
/// Shares its index space with [`ResonatorModel`]: while the easter-egg flag
/// is set, the selected model index is read as an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FxType {
    /// Formant filter.
    #[default]
    Formant = 0,
    /// Chorus.
    Chorus = 1,
    /// Reverb.
    Reverb = 2,
    /// Alternate formant filter.
    Formant2 = 3,
    /// Ensemble.
    Ensemble = 4,
    /// Alternate reverb.
    Reverb2 = 5,
}

impl FxType {
    /// Index shared with [`ResonatorModel`].
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// True for the two reverb variants.
    #[inline]
    pub const fn is_reverb(self) -> bool {
        matches!(self, Self::Reverb | Self::Reverb2)
    }
}

impl From<ResonatorModel> for FxType {
    fn from(model: ResonatorModel) -> Self {
        match model {
            ResonatorModel::Modal => Self::Formant,
            ResonatorModel::SympatheticString => Self::Chorus,
            ResonatorModel::String => Self::Reverb,
            ResonatorModel::FmVoice => Self::Formant2,
            ResonatorModel::SympatheticStringQuantized => Self::Ensemble,
            ResonatorModel::StringAndReverb => Self::Reverb2,
        }
    }
}

/// Per-block timbral parameters.
///
/// `structure`, `damping` and `position` lie in `[0, 0.9995]`; `brightness`
/// lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    /// Inharmonicity / chord selection.
    pub structure: f32,
    /// High-frequency content of the excitation and resonator.
    pub brightness: f32,
    /// Decay time.
    pub damping: f32,
    /// Excitation or pick-up position along the resonator.
    pub position: f32,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            structure: 0.5,
            brightness: 0.5,
            damping: 0.5,
            position: 0.5,
        }
    }
}

/// Per-block performance events and pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerformanceState {
    /// Note from the V/OCT input, in semitones.
    pub note: f32,
    /// Coarse tuning in semitones, `12..=72`.
    pub tonic: f32,
    /// Frequency modulation in semitones, `-48..=48`.
    pub fm: f32,
    /// Chord index, `0..NUM_CHORDS`.
    pub chord: usize,
    /// True for exactly one block after a strum.
    pub strum: bool,
    /// The audio input is unpatched; the engine excites itself.
    pub internal_exciter: bool,
    /// The strum input is unpatched; strums are detected internally.
    pub internal_strum: bool,
    /// The V/OCT input is unpatched.
    pub internal_note: bool,
}

/// The main synthesis engine.
///
/// Implementations must process exactly [`block_size`](Self::block_size)
/// samples per call. The module checks this once at construction.
pub trait Resonator {
    /// Samples per call. Must equal [`BLOCK_SIZE`].
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Current voice count.
    fn polyphony(&self) -> usize;

    /// Sets the voice count (1, 2 or 4).
    fn set_polyphony(&mut self, voices: usize);

    /// Selects the resonator model.
    fn set_model(&mut self, model: ResonatorModel);

    /// Renders one block into `out` and `aux`.
    ///
    /// `scratch` is the shared reverb arena, at least
    /// [`REVERB_BUFFER_SIZE`] elements long.
    fn process(
        &mut self,
        performance: &PerformanceState,
        patch: &Patch,
        input: &[f32],
        out: &mut [f32],
        aux: &mut [f32],
        scratch: &mut [u16],
    );
}

/// The alternate synthesis engine used while the easter-egg flag is set.
pub trait StringSynth {
    /// Samples per call. Must equal [`BLOCK_SIZE`].
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Selects the effect.
    fn set_fx(&mut self, fx: FxType);

    /// Renders one block into `out` and `aux`.
    fn process(
        &mut self,
        performance: &PerformanceState,
        patch: &Patch,
        input: &[f32],
        out: &mut [f32],
        aux: &mut [f32],
        scratch: &mut [u16],
    );
}
