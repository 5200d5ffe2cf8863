//! Offline render command.

use annuli_config::ModuleState;
use annuli_io::{StereoRender, WavSpec, read_wav, write_wav_stereo};
use annuli_module::{
    Annuli, Jacks, Knobs, ModeSnapshot, Outputs, ResonatorModel, reference::PluckedStrings,
};
use annuli_platform::{InputJack, REFERENCE_VOLTAGE};
use anyhow::Context;
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Strum clock gate length in seconds.
const STRUM_GATE_SECONDS: f32 = 0.005;

/// Ticks between progress bar updates.
const PROGRESS_STRIDE: usize = 4096;

/// Resonator models for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliModel {
    Modal,
    Sympathetic,
    Inharmonic,
    Fm,
    Quantized,
    Reverb,
}

impl From<CliModel> for ResonatorModel {
    fn from(m: CliModel) -> Self {
        match m {
            CliModel::Modal => ResonatorModel::Modal,
            CliModel::Sympathetic => ResonatorModel::SympatheticString,
            CliModel::Inharmonic => ResonatorModel::String,
            CliModel::Fm => ResonatorModel::FmVoice,
            CliModel::Quantized => ResonatorModel::SympatheticStringQuantized,
            CliModel::Reverb => ResonatorModel::StringAndReverb,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file (stereo: odd, even)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Host sample rate [default: input file rate, else 44100]
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Duration in seconds [default: input file length, else 2.0]
    #[arg(long)]
    duration: Option<f32>,

    /// WAV file patched into the audio input
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Constant V/OCT voltage patched into the pitch input
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f32>,

    /// Strum clock rate in Hz (patches the strum input)
    #[arg(long)]
    strum_hz: Option<f32>,

    /// Patch only the odd output (both channels are summed)
    #[arg(long)]
    mono: bool,

    /// Saved mode state (.json or .toml)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Polyphony position (0, 1 or 2), overrides --state
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..3))]
    polyphony: Option<u8>,

    /// Resonator model, overrides --state
    #[arg(long, value_enum)]
    model: Option<CliModel>,

    /// Render with the alternate string-synth engine
    #[arg(long)]
    easter_egg: bool,

    /// Coarse frequency in semitones (0-60)
    #[arg(long, default_value = "30.0")]
    frequency: f32,

    /// Structure (0-1)
    #[arg(long, default_value = "0.5")]
    structure: f32,

    /// Brightness (0-1)
    #[arg(long, default_value = "0.5")]
    brightness: f32,

    /// Damping (0-1)
    #[arg(long, default_value = "0.5")]
    damping: f32,

    /// Position (0-1)
    #[arg(long, default_value = "0.5")]
    position: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Everything a render needs once files have been read.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub sample_rate: u32,
    pub frames: usize,
    pub knobs: Knobs,
    pub mode: ModeSnapshot,
    pub pitch: Option<f32>,
    pub strum_hz: Option<f32>,
    pub mono: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frames: 44100,
            knobs: Knobs::default(),
            mode: ModeSnapshot::default(),
            pitch: None,
            strum_hz: None,
            mono: false,
        }
    }
}

/// Strum clock level at `tick`: a 5 V gate at the start of each period.
fn strum_level(tick: usize, sample_rate: f32, hz: f32) -> f32 {
    if hz <= 0.0 {
        return 0.0;
    }
    let period = sample_rate / hz;
    let gate = (STRUM_GATE_SECONDS * sample_rate).min(period * 0.5);
    if (tick as f32) % period < gate {
        REFERENCE_VOLTAGE
    } else {
        0.0
    }
}

/// Runs the module tick by tick. `input` is in ±1 full scale; the output is
/// the two jack voltages scaled back to ±1.
pub fn render(
    settings: &RenderSettings,
    input: Option<&[f32]>,
    progress: &ProgressBar,
) -> anyhow::Result<StereoRender> {
    let mut module = Annuli::new(PluckedStrings::new(), PluckedStrings::new())
        .context("failed to build module")?;
    module.set_mode(settings.mode);

    let sample_rate = settings.sample_rate as f32;
    let mut jacks = Jacks {
        pitch: settings
            .pitch
            .map_or_else(InputJack::unpatched, InputJack::patched),
        ..Jacks::default()
    };
    let mut outputs = if settings.mono {
        Outputs::mono()
    } else {
        Outputs::stereo()
    };
    let mut render = StereoRender::with_capacity(settings.frames);

    for tick in 0..settings.frames {
        if let Some(input) = input {
            jacks.audio = InputJack::patched(
                input.get(tick).copied().unwrap_or(0.0) * REFERENCE_VOLTAGE,
            );
        }
        if let Some(hz) = settings.strum_hz {
            jacks.strum = InputJack::patched(strum_level(tick, sample_rate, hz));
        }

        module.process(&settings.knobs, &jacks, &mut outputs, sample_rate);
        render.push(
            outputs.odd.voltage / REFERENCE_VOLTAGE,
            outputs.even.voltage / REFERENCE_VOLTAGE,
        );

        if tick % PROGRESS_STRIDE == 0 {
            progress.set_position(tick as u64);
        }
    }
    progress.finish_and_clear();

    tracing::debug!(
        blocks = module.blocks_rendered(),
        mode = ?module.mode(),
        "render finished"
    );
    Ok(render)
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth {} (expected 16, 24 or 32)", args.bit_depth);
    }

    let input = match &args.input {
        Some(path) => {
            let (samples, spec) = read_wav(path)
                .with_context(|| format!("failed to read input '{}'", path.display()))?;
            tracing::info!(
                path = %path.display(),
                frames = samples.len(),
                sample_rate = spec.sample_rate,
                "loaded input"
            );
            Some((samples, spec.sample_rate))
        }
        None => None,
    };

    let sample_rate = args
        .sample_rate
        .or(input.as_ref().map(|(_, rate)| *rate))
        .unwrap_or(44100);
    if sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }
    if let Some((_, rate)) = &input
        && *rate != sample_rate
    {
        tracing::warn!(file = rate, host = sample_rate, "input is played at the host rate");
    }

    let duration = match (args.duration, &input) {
        (Some(d), _) => d,
        (None, Some((samples, _))) => samples.len() as f32 / sample_rate as f32,
        (None, None) => 2.0,
    };
    if !(duration.is_finite() && duration >= 0.0) {
        anyhow::bail!("duration must be a non-negative number of seconds");
    }

    let mut mode = match &args.state {
        Some(path) => ModuleState::load(path)
            .with_context(|| format!("failed to load state '{}'", path.display()))?
            .to_snapshot(),
        None => ModeSnapshot::default(),
    };
    if let Some(polyphony) = args.polyphony {
        mode.polyphony = polyphony;
    }
    if let Some(model) = args.model {
        mode.model = model.into();
    }
    if args.easter_egg {
        mode.easter_egg = true;
    }

    let settings = RenderSettings {
        sample_rate,
        frames: (duration * sample_rate as f32).round() as usize,
        knobs: Knobs {
            frequency: args.frequency,
            structure: args.structure,
            brightness: args.brightness,
            damping: args.damping,
            position: args.position,
            ..Knobs::default()
        },
        mode,
        pitch: args.pitch,
        strum_hz: args.strum_hz,
        mono: args.mono,
    };

    tracing::info!(
        output = %args.output.display(),
        sample_rate,
        duration,
        voices = mode.voices(),
        model = mode.model.name(),
        easter_egg = mode.easter_egg,
        "rendering"
    );

    let progress = ProgressBar::new(settings.frames as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let output = render(
        &settings,
        input.as_ref().map(|(samples, _)| samples.as_slice()),
        &progress,
    )?;

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav_stereo(&args.output, &output, spec)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    tracing::info!(frames = output.len(), peak = output.peak(), "done");
    Ok(())
}
