//! Reference synthesis engine.
//!
//! [`PluckedStrings`] is a small Karplus–Strong string bank that implements
//! both [`Resonator`] and [`StringSynth`], so the module can be run and
//! listened to without a full physical-modelling engine. It responds to the
//! same controls a real engine does:
//!
//! | Control | Effect |
//! |---------|--------|
//! | `note + tonic + fm` | pitch of the plucked string |
//! | `strum` | plucks the next voice (round-robin over the polyphony) |
//! | `internal_exciter` | noise burst on strum; otherwise the input block drives the string |
//! | `brightness` | loop lowpass and burst level |
//! | `damping` | decay time, 0.1 s to 6.4 s |
//! | `position` | pick-up tap along the string, sent to the aux output |
//! | `chord` | tuning of the sympathetic strings |
//!
//! The sympathetic models tune the idle voices to a chord and feed them a
//! little of the plucked voice. The reverb model and the two reverb effects
//! add an echo tail stored in the shared scratch arena. Other effects render
//! dry.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec};

use annuli_core::{clamp, flush_denormal, lerp, semitones_to_ratio};
use libm::{powf, roundf};

use crate::engine::{
    ENGINE_SAMPLE_RATE, FxType, MAX_POLYPHONY, NUM_CHORDS, Patch, PerformanceState, Resonator,
    ResonatorModel, StringSynth,
};

/// Delay-line length per voice. Lowest pitch is about 23.5 Hz.
const MAX_DELAY: usize = 2048;
const DELAY_MASK: usize = MAX_DELAY - 1;

/// Chord intervals, in semitones, for the three sympathetic voices.
const CHORDS: [[f32; 3]; NUM_CHORDS] = [
    [-12.0, -0.02, 0.02],
    [-12.0, 0.0, 7.0],
    [-12.0, 0.0, 12.0],
    [-12.0, 3.0, 7.0],
    [-12.0, 4.0, 7.0],
    [-12.0, 3.0, 10.0],
    [-12.0, 4.0, 11.0],
    [-12.0, 5.0, 7.0],
    [-12.0, 2.0, 7.0],
    [-12.0, 7.0, 14.0],
    [-12.0, 7.0, 19.0],
];

/// Fraction of the plucked voice fed to the sympathetic voices.
const SYMPATHETIC_COUPLING: f32 = 0.05;

const ECHO_FEEDBACK: f32 = 0.45;
const ECHO_MIX: f32 = 0.35;

/// Delay length in samples for a MIDI-style note number.
pub fn period_for(note: f32) -> f32 {
    let hz = 440.0 * semitones_to_ratio(note - 69.0);
    clamp(ENGINE_SAMPLE_RATE / hz, 2.0, (MAX_DELAY - 2) as f32)
}

#[derive(Debug, Clone)]
struct StringVoice {
    line: Box<[f32]>,
    write: usize,
    period: f32,
    filter: f32,
    burst: u32,
    noise: u32,
}

impl StringVoice {
    fn new(seed: u32) -> Self {
        Self {
            line: vec![0.0; MAX_DELAY].into_boxed_slice(),
            write: 0,
            period: period_for(60.0),
            filter: 0.0,
            burst: 0,
            noise: seed,
        }
    }

    fn pluck(&mut self, burst_len: u32) {
        self.burst = burst_len;
    }

    fn noise(&mut self) -> f32 {
        let mut x = self.noise;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise = x;
        (x as i32 as f32) / (i32::MAX as f32)
    }

    /// Reads the line `delay` samples behind the write head.
    fn read(&self, delay: f32) -> f32 {
        let pos = self.write as f32 + MAX_DELAY as f32 - delay;
        let index = pos as usize;
        let frac = pos - index as f32;
        let a = self.line[index & DELAY_MASK];
        let b = self.line[(index + 1) & DELAY_MASK];
        lerp(a, b, frac)
    }

    /// Advances one sample. Returns the string output.
    fn tick(&mut self, excitation: f32, feedback: f32, lowpass: f32, burst_gain: f32) -> f32 {
        let burst = if self.burst > 0 {
            self.burst -= 1;
            self.noise() * burst_gain
        } else {
            0.0
        };
        let delayed = self.read(self.period);
        self.filter = flush_denormal(self.filter + (delayed - self.filter) * lowpass);
        self.line[self.write] = self.filter * feedback + excitation + burst;
        self.write = (self.write + 1) & DELAY_MASK;
        delayed
    }

    fn clear(&mut self) {
        self.line.fill(0.0);
        self.filter = 0.0;
        self.burst = 0;
    }
}

/// Polyphonic Karplus–Strong engine.
///
/// # Example
///
/// ```rust
/// use annuli_module::{
///     BLOCK_SIZE, Patch, PerformanceState, REVERB_BUFFER_SIZE, Resonator, reference::PluckedStrings,
/// };
///
/// let mut strings = PluckedStrings::new();
/// let mut scratch = vec![0u16; REVERB_BUFFER_SIZE];
/// let perf = PerformanceState {
///     note: 0.0,
///     tonic: 57.0,
///     strum: true,
///     internal_exciter: true,
///     ..PerformanceState::default()
/// };
/// let mut out = [0.0; BLOCK_SIZE];
/// let mut aux = [0.0; BLOCK_SIZE];
/// Resonator::process(
///     &mut strings,
///     &perf,
///     &Patch::default(),
///     &[0.0; BLOCK_SIZE],
///     &mut out,
///     &mut aux,
///     &mut scratch,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PluckedStrings {
    voices: [StringVoice; MAX_POLYPHONY],
    polyphony: usize,
    active: usize,
    model: ResonatorModel,
    fx: FxType,
    echo_pos: usize,
}

impl PluckedStrings {
    /// Silent engine, one voice, modal model.
    pub fn new() -> Self {
        Self {
            voices: core::array::from_fn(|i| {
                StringVoice::new(0x1234_5678 ^ (i as u32 + 1).wrapping_mul(0x9E37_79B9))
            }),
            polyphony: 1,
            active: 0,
            model: ResonatorModel::Modal,
            fx: FxType::Formant,
            echo_pos: 0,
        }
    }

    /// Currently selected model.
    pub fn model(&self) -> ResonatorModel {
        self.model
    }

    /// Currently selected effect.
    pub fn fx(&self) -> FxType {
        self.fx
    }

    /// Silences every string.
    pub fn clear(&mut self) {
        for voice in &mut self.voices {
            voice.clear();
        }
        self.echo_pos = 0;
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        &mut self,
        model: ResonatorModel,
        reverb: bool,
        performance: &PerformanceState,
        patch: &Patch,
        input: &[f32],
        out: &mut [f32],
        aux: &mut [f32],
        scratch: &mut [u16],
    ) {
        let sympathetic = matches!(
            model,
            ResonatorModel::SympatheticString | ResonatorModel::SympatheticStringQuantized
        );
        let mut root = performance.note + performance.tonic + performance.fm;
        if model == ResonatorModel::SympatheticStringQuantized {
            root = roundf(root);
        }
        let period = period_for(root);
        let voices = self.polyphony.clamp(1, MAX_POLYPHONY);

        if performance.strum {
            self.active = (self.active + 1) % voices;
            let burst = if performance.internal_exciter {
                match model {
                    // Short hammer strike for the modal model.
                    ResonatorModel::Modal => (period * 0.25) as u32,
                    _ => period as u32,
                }
            } else {
                0
            };
            self.voices[self.active].pluck(burst);
        }

        self.voices[self.active].period = period;
        if sympathetic {
            let chord = &CHORDS[performance.chord.min(NUM_CHORDS - 1)];
            let mut k = 0;
            for (v, voice) in self.voices.iter_mut().enumerate().take(voices) {
                if v != self.active {
                    voice.period = period_for(root + chord[k % chord.len()]);
                    k += 1;
                }
            }
        }

        // Decay to -60 dB in t60 seconds: g = 10^(-3 · period / (t60 · sr))
        let t60 = 0.1 * powf(2.0, patch.damping * 6.0);
        let lowpass = 0.05 + 0.95 * patch.brightness;
        let burst_gain = 0.5 + 0.5 * patch.brightness;
        let pickup = 0.5 + 0.5 * patch.position;
        let norm = 1.0 / voices as f32;
        let mut feedback = [0.0f32; MAX_POLYPHONY];
        for (g, voice) in feedback.iter_mut().zip(self.voices.iter()).take(voices) {
            *g = powf(10.0, -3.0 * voice.period / (t60 * ENGINE_SAMPLE_RATE));
        }

        let active = self.active;
        let mut coupling = 0.0f32;
        for i in 0..out.len().min(aux.len()) {
            let drive = if performance.internal_exciter {
                0.0
            } else {
                input.get(i).copied().unwrap_or(0.0)
            };

            let mut odd = 0.0;
            let mut even = 0.0;
            let mut next_coupling = 0.0;
            for (v, voice) in self.voices.iter_mut().enumerate().take(voices) {
                let excitation = if v == active {
                    drive
                } else if sympathetic {
                    coupling * SYMPATHETIC_COUPLING
                } else {
                    0.0
                };
                let s = voice.tick(excitation, feedback[v], lowpass, burst_gain);
                if v == active {
                    next_coupling = s;
                }
                odd += s;
                even += voice.read((voice.period * pickup).max(1.0));
            }
            coupling = next_coupling;

            if reverb && !scratch.is_empty() {
                if self.echo_pos >= scratch.len() {
                    self.echo_pos = 0;
                }
                let echo = decode(scratch[self.echo_pos]);
                scratch[self.echo_pos] = encode(0.5 * (odd + even) + echo * ECHO_FEEDBACK);
                self.echo_pos += 1;
                odd += echo * ECHO_MIX;
                even += echo * ECHO_MIX;
            }

            out[i] = odd * norm;
            aux[i] = even * norm;
        }
    }
}

impl Default for PluckedStrings {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores a sample in the arena as a 16-bit two's-complement word.
#[inline]
fn encode(sample: f32) -> u16 {
    (clamp(sample, -1.0, 1.0) * 32767.0) as i16 as u16
}

#[inline]
fn decode(word: u16) -> f32 {
    f32::from(word as i16) / 32767.0
}

impl Resonator for PluckedStrings {
    fn polyphony(&self) -> usize {
        self.polyphony
    }

    fn set_polyphony(&mut self, voices: usize) {
        self.polyphony = voices.clamp(1, MAX_POLYPHONY);
        self.active %= self.polyphony;
    }

    fn set_model(&mut self, model: ResonatorModel) {
        self.model = model;
    }

    fn process(
        &mut self,
        performance: &PerformanceState,
        patch: &Patch,
        input: &[f32],
        out: &mut [f32],
        aux: &mut [f32],
        scratch: &mut [u16],
    ) {
        let model = self.model;
        let reverb = model == ResonatorModel::StringAndReverb;
        self.render(model, reverb, performance, patch, input, out, aux, scratch);
    }
}

impl StringSynth for PluckedStrings {
    fn set_fx(&mut self, fx: FxType) {
        self.fx = fx;
    }

    fn process(
        &mut self,
        performance: &PerformanceState,
        patch: &Patch,
        input: &[f32],
        out: &mut [f32],
        aux: &mut [f32],
        scratch: &mut [u16],
    ) {
        let reverb = self.fx.is_reverb();
        self.render(ResonatorModel::String, reverb, performance, patch, input, out, aux, scratch);
    }
}
