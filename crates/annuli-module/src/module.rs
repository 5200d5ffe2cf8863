//! The block scheduler.
//!
//! [`Annuli`] runs once per host sample. Host-rate audio accumulates in an
//! input queue; whenever the output queue has drained, one engine block is
//! rendered:
//!
//! ```text
//!  host tick ──► input queue ──► SRC (host→48k) ──► 24-sample block
//!                                                        │
//!        buttons ──► mode ─► reconfigure on change       ▼
//!  knobs + CV ──► Patch / PerformanceState ──► strummer ──► engine
//!                                                        │
//!  host out ◄── routing ◄── output queue ◄── SRC (48k→host) ◄┘
//! ```
//!
//! # Output Routing
//!
//! With both output jacks patched the main and auxiliary blocks leave on
//! separate jacks. With fewer than two patched they are summed and the same
//! signal appears on both.
//!
//! # Strum Timing
//!
//! A high strum input latches until the next block is rendered. The block's
//! strum is the rising edge of that latch compared to the previous block's
//! latch, so a gate that is still high, or high again, in the very next block
//! does not strum twice.

use annuli_core::{FrameQueue, MonoFrame, SampleRateConverter, StereoFrame};
use annuli_platform::REFERENCE_VOLTAGE;

use crate::builder::{build_patch, build_performance};
use crate::controls::{Jacks, Knobs, Outputs};
use crate::engine::{
    BLOCK_SIZE, ENGINE_SAMPLE_RATE, FxType, Patch, PerformanceState, Resonator, ResonatorModel,
    StringSynth,
};
use crate::error::ModuleError;
use crate::mode::{Lights, ModeSelector, ModeSnapshot};
use crate::scratch::ScratchBuffer;
use crate::strummer::Strummer;

/// Frames held by each of the two queues.
pub const QUEUE_CAPACITY: usize = 256;

/// Strum input level that counts as high.
pub const STRUM_THRESHOLD: f32 = 1.0;

/// Engine configuration last sent, so unchanged settings are not resent.
#[derive(Debug, Clone, Copy, Default)]
struct AppliedConfig {
    voices: Option<usize>,
    model: Option<ResonatorModel>,
    fx: Option<FxType>,
}

/// The resonator module.
///
/// Generic over its two engines; [`reference::PluckedStrings`](crate::reference::PluckedStrings)
/// implements both.
///
/// # Example
///
/// ```rust
/// use annuli_module::{Annuli, Jacks, Knobs, Outputs, reference::PluckedStrings};
/// use annuli_platform::InputJack;
///
/// let mut module = Annuli::new(PluckedStrings::new(), PluckedStrings::new())?;
/// let knobs = Knobs::default();
/// let mut jacks = Jacks::default();
/// let mut outputs = Outputs::stereo();
///
/// for i in 0..4410 {
///     // 10 Hz strum clock
///     jacks.strum = InputJack::patched(if i % 4410 < 100 { 5.0 } else { 0.0 });
///     module.process(&knobs, &jacks, &mut outputs, 44100.0);
/// }
/// # Ok::<(), annuli_module::ModuleError>(())
/// ```
pub struct Annuli<R, S> {
    resonator: R,
    string_synth: S,
    scratch: ScratchBuffer,
    strummer: Strummer,

    input_src: SampleRateConverter<1>,
    output_src: SampleRateConverter<2>,
    input_queue: FrameQueue<MonoFrame, QUEUE_CAPACITY>,
    output_queue: FrameQueue<StereoFrame, QUEUE_CAPACITY>,

    selector: ModeSelector,
    applied: AppliedConfig,

    strum: bool,
    last_strum: bool,

    last_patch: Patch,
    last_performance: PerformanceState,
    blocks_rendered: u64,
}

impl<R: Resonator, S: StringSynth> Annuli<R, S> {
    /// Builds a module with a freshly allocated scratch arena.
    pub fn new(resonator: R, string_synth: S) -> Result<Self, ModuleError> {
        Self::with_scratch(resonator, string_synth, ScratchBuffer::new())
    }

    /// Builds a module around caller-provided scratch storage.
    ///
    /// Fails if either engine runs at a block size other than [`BLOCK_SIZE`].
    pub fn with_scratch(
        resonator: R,
        string_synth: S,
        scratch: ScratchBuffer,
    ) -> Result<Self, ModuleError> {
        for actual in [resonator.block_size(), string_synth.block_size()] {
            if actual != BLOCK_SIZE {
                return Err(ModuleError::InvalidBlockSize {
                    expected: BLOCK_SIZE,
                    actual,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(scratch = scratch.len(), "annuli module initialised");

        Ok(Self {
            resonator,
            string_synth,
            scratch,
            strummer: Strummer::new(),
            input_src: SampleRateConverter::new(),
            output_src: SampleRateConverter::new(),
            input_queue: FrameQueue::new(),
            output_queue: FrameQueue::new(),
            selector: ModeSelector::new(),
            applied: AppliedConfig::default(),
            strum: false,
            last_strum: false,
            last_patch: Patch::default(),
            last_performance: PerformanceState::default(),
            blocks_rendered: 0,
        })
    }

    /// Runs one host tick.
    ///
    /// `sample_rate` is the host rate for this tick; it may change between
    /// calls. Output jacks keep their previous voltage if no frame is
    /// available.
    pub fn process(&mut self, knobs: &Knobs, jacks: &Jacks, outputs: &mut Outputs, sample_rate: f32) {
        if !self.input_queue.is_full() {
            self.input_queue
                .push(MonoFrame::mono(jacks.audio.normalize(0.0) / REFERENCE_VOLTAGE));
        }

        if !self.strum {
            self.strum = jacks.strum.normalize(0.0) >= STRUM_THRESHOLD;
        }

        self.selector.process(knobs);

        if self.output_queue.is_empty() {
            self.render_block(knobs, jacks, sample_rate);
        }

        if let Some(frame) = self.output_queue.pop() {
            let [main, aux] = frame.samples;
            if outputs.is_split() {
                outputs.odd.drive(main);
                outputs.even.drive(aux);
            } else {
                let mixed = main + aux;
                outputs.odd.drive(mixed);
                outputs.even.drive(mixed);
            }
        }
    }

    fn render_block(&mut self, knobs: &Knobs, jacks: &Jacks, sample_rate: f32) {
        let mut frames = [MonoFrame::SILENCE; BLOCK_SIZE];
        let ratio = ENGINE_SAMPLE_RATE / sample_rate;
        let (consumed, _) = self
            .input_src
            .process(self.input_queue.peek(), &mut frames, ratio);
        self.input_queue.advance(consumed);
        let input: [f32; BLOCK_SIZE] = core::array::from_fn(|i| frames[i].samples[0]);

        let mode = self.selector.mode();
        self.configure(&mode);

        let (patch, structure) = build_patch(knobs, jacks);
        let strum = self.strum && !self.last_strum;
        self.last_strum = self.strum;
        self.strum = false;
        let mut performance = build_performance(knobs, jacks, structure, strum);

        let mut out = [0.0f32; BLOCK_SIZE];
        let mut aux = [0.0f32; BLOCK_SIZE];
        let scratch = self.scratch.as_mut_slice();
        if mode.easter_egg {
            self.strummer.process(None, &mut performance);
            self.string_synth
                .process(&performance, &patch, &input, &mut out, &mut aux, scratch);
        } else {
            self.strummer.process(Some(input.as_slice()), &mut performance);
            self.resonator
                .process(&performance, &patch, &input, &mut out, &mut aux, scratch);
        }

        let frames: [StereoFrame; BLOCK_SIZE] =
            core::array::from_fn(|i| StereoFrame::stereo(out[i], aux[i]));
        let (_, produced) = self.output_src.process(
            &frames,
            self.output_queue.write_window(),
            sample_rate / ENGINE_SAMPLE_RATE,
        );
        self.output_queue.commit(produced);

        #[cfg(feature = "tracing")]
        if performance.strum {
            tracing::trace!(block = self.blocks_rendered, "strum");
        }

        self.last_patch = patch;
        self.last_performance = performance;
        self.blocks_rendered += 1;
    }

    /// Sends polyphony and model/effect to the engines when they differ from
    /// what was last sent.
    fn configure(&mut self, mode: &ModeSnapshot) {
        let voices = mode.voices();
        if self.applied.voices != Some(voices) {
            #[cfg(feature = "tracing")]
            tracing::debug!(voices, "engine polyphony");
            self.resonator.set_polyphony(voices);
            self.applied.voices = Some(voices);
        }

        if mode.easter_egg {
            let fx = FxType::from(mode.model);
            if self.applied.fx != Some(fx) {
                #[cfg(feature = "tracing")]
                tracing::debug!(?fx, "string synth effect");
                self.string_synth.set_fx(fx);
                self.applied.fx = Some(fx);
            }
        } else if self.applied.model != Some(mode.model) {
            #[cfg(feature = "tracing")]
            tracing::debug!(model = ?mode.model, "resonator model");
            self.resonator.set_model(mode.model);
            self.applied.model = Some(mode.model);
        }
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> ModeSnapshot {
        self.selector.mode()
    }

    /// Replaces the mode, e.g. after loading saved state.
    pub fn set_mode(&mut self, mode: ModeSnapshot) {
        self.selector.set_mode(mode);
    }

    /// Selects a resonator model directly.
    pub fn set_model(&mut self, model: ResonatorModel) {
        self.selector.set_model(model);
    }

    /// Flips between the resonator and the string synth.
    pub fn toggle_easter_egg(&mut self) {
        self.selector.toggle_easter_egg();
    }

    /// Polyphony 0 and the modal model. Audio buffers are not flushed.
    pub fn reset(&mut self) {
        self.selector.reset();
    }

    /// Indicator state.
    #[inline]
    pub fn lights(&self) -> Lights {
        self.selector.lights()
    }

    /// Patch used for the most recent block.
    #[inline]
    pub fn last_patch(&self) -> &Patch {
        &self.last_patch
    }

    /// Performance state (after the strummer) used for the most recent block.
    #[inline]
    pub fn last_performance(&self) -> &PerformanceState {
        &self.last_performance
    }

    /// Number of engine blocks rendered since construction.
    #[inline]
    pub fn blocks_rendered(&self) -> u64 {
        self.blocks_rendered
    }

    /// Host-rate frames waiting to be converted into the next block.
    #[inline]
    pub fn pending_input(&self) -> usize {
        self.input_queue.len()
    }

    /// Host-rate frames rendered but not yet output.
    #[inline]
    pub fn pending_output(&self) -> usize {
        self.output_queue.len()
    }

    /// The resonator engine.
    pub fn resonator(&self) -> &R {
        &self.resonator
    }

    /// The resonator engine, mutably.
    pub fn resonator_mut(&mut self) -> &mut R {
        &mut self.resonator
    }

    /// The string-synth engine.
    pub fn string_synth(&self) -> &S {
        &self.string_synth
    }

    /// The string-synth engine, mutably.
    pub fn string_synth_mut(&mut self) -> &mut S {
        &mut self.string_synth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::PluckedStrings;
    use annuli_platform::InputJack;

    /// Engine that outputs constant blocks and counts configuration calls.
    #[derive(Default)]
    struct Constant {
        main: f32,
        aux: f32,
        polyphony: usize,
        polyphony_calls: usize,
        model_calls: usize,
        fx_calls: usize,
        block_size: usize,
    }

    impl Constant {
        fn new(main: f32, aux: f32) -> Self {
            Self {
                main,
                aux,
                block_size: BLOCK_SIZE,
                ..Self::default()
            }
        }
    }

    impl Resonator for Constant {
        fn block_size(&self) -> usize {
            self.block_size
        }
        fn polyphony(&self) -> usize {
            self.polyphony
        }
        fn set_polyphony(&mut self, voices: usize) {
            self.polyphony = voices;
            self.polyphony_calls += 1;
        }
        fn set_model(&mut self, _model: ResonatorModel) {
            self.model_calls += 1;
        }
        fn process(
            &mut self,
            _performance: &PerformanceState,
            _patch: &Patch,
            _input: &[f32],
            out: &mut [f32],
            aux: &mut [f32],
            _scratch: &mut [u16],
        ) {
            out.fill(self.main);
            aux.fill(self.aux);
        }
    }

    impl StringSynth for Constant {
        fn block_size(&self) -> usize {
            self.block_size
        }
        fn set_fx(&mut self, _fx: FxType) {
            self.fx_calls += 1;
        }
        fn process(
            &mut self,
            _performance: &PerformanceState,
            _patch: &Patch,
            _input: &[f32],
            out: &mut [f32],
            aux: &mut [f32],
            _scratch: &mut [u16],
        ) {
            out.fill(-self.main);
            aux.fill(-self.aux);
        }
    }

    fn run(module: &mut Annuli<Constant, Constant>, outputs: &mut Outputs, ticks: usize) {
        for _ in 0..ticks {
            module.process(&Knobs::default(), &Jacks::default(), outputs, 48000.0);
        }
    }

    #[test]
    fn test_rejects_wrong_block_size() {
        let mut bad = Constant::new(0.0, 0.0);
        bad.block_size = 32;
        let err = Annuli::new(bad, Constant::new(0.0, 0.0)).err();
        assert_eq!(
            err,
            Some(ModuleError::InvalidBlockSize {
                expected: BLOCK_SIZE,
                actual: 32,
            })
        );
    }

    #[test]
    fn test_first_tick_renders_one_block() {
        let mut module = Annuli::new(Constant::new(0.1, 0.2), Constant::new(0.0, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        run(&mut module, &mut outputs, 1);
        assert_eq!(module.blocks_rendered(), 1);
        // Unity ratio: one block in, one block out, minus the frame just popped.
        assert_eq!(module.pending_output(), BLOCK_SIZE - 1);
    }

    #[test]
    fn test_one_block_per_twenty_four_ticks_at_engine_rate() {
        let mut module = Annuli::new(Constant::new(0.1, 0.2), Constant::new(0.0, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        run(&mut module, &mut outputs, BLOCK_SIZE * 10);
        assert_eq!(module.blocks_rendered(), 10);
    }

    #[test]
    fn test_reconfigures_only_on_change() {
        let mut module = Annuli::new(Constant::new(0.0, 0.0), Constant::new(0.0, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        run(&mut module, &mut outputs, BLOCK_SIZE * 20);
        assert_eq!(module.resonator().polyphony_calls, 1);
        assert_eq!(module.resonator().model_calls, 1);
        assert_eq!(module.string_synth().fx_calls, 0);

        module.set_mode(ModeSnapshot {
            polyphony: 2,
            ..module.mode()
        });
        run(&mut module, &mut outputs, BLOCK_SIZE * 20);
        assert_eq!(module.resonator().polyphony_calls, 2);
        assert_eq!(module.resonator().polyphony, 4);
        assert_eq!(module.resonator().model_calls, 1);
    }

    #[test]
    fn test_easter_egg_switches_engine() {
        let mut module = Annuli::new(Constant::new(0.2, 0.0), Constant::new(0.2, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        run(&mut module, &mut outputs, BLOCK_SIZE);
        // Steady state of the converter: delayed by the filter half-width.
        assert!((outputs.odd.voltage - 1.0).abs() < 1e-4);

        module.toggle_easter_egg();
        run(&mut module, &mut outputs, BLOCK_SIZE * 4);
        assert!((outputs.odd.voltage + 1.0).abs() < 1e-4);
        assert_eq!(module.string_synth().fx_calls, 1);
    }

    #[test]
    fn test_invalid_sample_rate_holds_outputs() {
        let mut module = Annuli::new(Constant::new(0.5, 0.5), Constant::new(0.0, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        outputs.odd.voltage = 1.25;
        for _ in 0..100 {
            module.process(&Knobs::default(), &Jacks::default(), &mut outputs, 0.0);
        }
        assert_eq!(outputs.odd.voltage, 1.25);
        assert_eq!(module.pending_output(), 0);
    }

    #[test]
    fn test_input_queue_never_overflows() {
        let mut module = Annuli::new(Constant::new(0.0, 0.0), Constant::new(0.0, 0.0)).unwrap();
        let mut outputs = Outputs::stereo();
        let jacks = Jacks {
            audio: InputJack::patched(1.0),
            ..Jacks::default()
        };
        // Very low host rate: blocks drain the input queue slowly.
        for _ in 0..10_000 {
            module.process(&Knobs::default(), &jacks, &mut outputs, 1000.0);
            assert!(module.pending_input() <= QUEUE_CAPACITY);
        }
    }

    #[test]
    fn test_reference_engine_runs() {
        let mut module = Annuli::new(PluckedStrings::new(), PluckedStrings::new()).unwrap();
        let mut outputs = Outputs::stereo();
        let mut jacks = Jacks::default();
        let mut peak = 0.0f32;
        for i in 0..9600 {
            jacks.strum = InputJack::patched(if i < 48 { 5.0 } else { 0.0 });
            module.process(&Knobs::default(), &jacks, &mut outputs, 48000.0);
            peak = peak.max(outputs.odd.voltage.abs());
        }
        assert!(peak > 0.01, "peak {peak}");
        assert!(peak <= REFERENCE_VOLTAGE);
    }
}
