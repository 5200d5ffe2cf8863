//! Internal strum detection.
//!
//! With nothing patched into the strum input the module still needs to know
//! when to pluck. The [`Strummer`] derives the strum from whatever else is
//! patched, in priority order:
//!
//! 1. V/OCT patched: a note change of more than 0.4 semitones
//! 2. Audio patched: a transient in the input block
//! 3. Nothing patched: never
//!
//! Every accepted strum, internal or external, starts an inhibit timer
//! during which further strums are swallowed. Onsets use a timer four times
//! longer since a single transient tends to re-trigger the detector.

use annuli_core::EnvelopeFollower;

use crate::engine::{BLOCK_SIZE, ENGINE_SAMPLE_RATE, PerformanceState};

/// Minimum pitch step, in semitones, that counts as a new note.
pub const NOTE_CHANGE_THRESHOLD: f32 = 0.4;

/// Inter-onset inhibit time in seconds.
pub const INHIBIT_SECONDS: f32 = 0.01;

/// Fast follower must exceed the slow one by this factor to flag an onset.
const ONSET_RATIO: f32 = 2.0;

/// Absolute floor below which nothing counts as an onset.
const ONSET_FLOOR: f32 = 0.01;

/// Transient detector comparing a fast and a slow envelope.
#[derive(Debug, Clone)]
pub struct OnsetDetector {
    fast: EnvelopeFollower,
    slow: EnvelopeFollower,
    above: bool,
}

impl OnsetDetector {
    /// Creates a detector for audio at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            fast: EnvelopeFollower::with_times(sample_rate, 0.2, 5.0),
            slow: EnvelopeFollower::with_times(sample_rate, 20.0, 250.0),
            above: false,
        }
    }

    /// Feeds a block; true if the fast envelope rose past the slow one
    /// anywhere in it.
    pub fn process(&mut self, block: &[f32]) -> bool {
        let mut onset = false;
        for &sample in block {
            let fast = self.fast.process(sample);
            let slow = self.slow.process(sample);
            let above = fast > slow * ONSET_RATIO + ONSET_FLOOR;
            if above && !self.above {
                onset = true;
            }
            self.above = above;
        }
        onset
    }

    /// Clears both envelopes.
    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.above = false;
    }
}

/// Per-block strum arbiter.
///
/// # Example
///
/// ```rust
/// use annuli_module::{PerformanceState, Strummer};
///
/// let mut strummer = Strummer::new();
/// let mut perf = PerformanceState {
///     note: 12.0,
///     internal_strum: true,
///     internal_note: false,
///     ..PerformanceState::default()
/// };
/// strummer.process(None, &mut perf);
/// assert!(perf.strum, "first note differs from the power-on note");
/// ```
#[derive(Debug, Clone)]
pub struct Strummer {
    onset: OnsetDetector,
    inhibit_blocks: u32,
    inhibit_counter: u32,
    previous_note: f32,
}

impl Strummer {
    /// Note assumed before the first block.
    pub const INITIAL_NOTE: f32 = 69.0;

    /// Strummer running once per engine block.
    pub fn new() -> Self {
        Self::with_control_rate(INHIBIT_SECONDS, ENGINE_SAMPLE_RATE / BLOCK_SIZE as f32)
    }

    /// Strummer with an explicit inhibit time and block rate.
    pub fn with_control_rate(inhibit_seconds: f32, control_rate: f32) -> Self {
        Self {
            onset: OnsetDetector::new(ENGINE_SAMPLE_RATE),
            inhibit_blocks: (inhibit_seconds * control_rate) as u32,
            inhibit_counter: 0,
            previous_note: Self::INITIAL_NOTE,
        }
    }

    /// Inhibit length in blocks after a note-change or external strum.
    #[inline]
    pub fn inhibit_blocks(&self) -> u32 {
        self.inhibit_blocks
    }

    /// Decides `performance.strum` for this block.
    ///
    /// `input` is the engine's input block, or `None` when the active
    /// engine ignores audio input.
    pub fn process(&mut self, input: Option<&[f32]>, performance: &mut PerformanceState) {
        let has_onset = input.is_some_and(|block| self.onset.process(block));
        let note_changed = (performance.note - self.previous_note).abs() > NOTE_CHANGE_THRESHOLD;
        let mut inhibit = self.inhibit_blocks;

        if performance.internal_strum {
            if !performance.internal_note {
                performance.strum = note_changed;
            } else if !performance.internal_exciter {
                performance.strum = has_onset;
                inhibit *= 4;
            } else {
                performance.strum = false;
            }
        }

        if self.inhibit_counter > 0 {
            self.inhibit_counter -= 1;
            performance.strum = false;
        } else if performance.strum {
            self.inhibit_counter = inhibit;
        }

        self.previous_note = performance.note;
    }

    /// Clears the inhibit timer, onset envelopes and note memory.
    pub fn reset(&mut self) {
        self.onset.reset();
        self.inhibit_counter = 0;
        self.previous_note = Self::INITIAL_NOTE;
    }
}

impl Default for Strummer {
    fn default() -> Self {
        Self::new()
    }
}
