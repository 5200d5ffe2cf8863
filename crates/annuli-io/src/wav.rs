//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Read;
use std::path::Path;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// The module's two outputs, one vector per jack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoRender {
    /// ODD output, in ±1 full scale.
    pub odd: Vec<f32>,
    /// EVEN output, in ±1 full scale.
    pub even: Vec<f32>,
}

impl StereoRender {
    /// Wraps two channels.
    pub fn new(odd: Vec<f32>, even: Vec<f32>) -> Self {
        Self { odd, even }
    }

    /// Empty render with room for `frames` frames per channel.
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            odd: Vec::with_capacity(frames),
            even: Vec::with_capacity(frames),
        }
    }

    /// Appends one frame.
    #[inline]
    pub fn push(&mut self, odd: f32, even: f32) {
        self.odd.push(odd);
        self.even.push(even);
    }

    /// Number of frames (the shorter channel, if they differ).
    pub fn len(&self) -> usize {
        self.odd.len().min(self.even.len())
    }

    /// True if no frames are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest absolute sample across both channels.
    pub fn peak(&self) -> f32 {
        self.odd
            .iter()
            .chain(self.even.iter())
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}

fn full_scale(bits: u16) -> Result<f32> {
    match bits {
        8..=32 => Ok((1i64 << (bits - 1)) as f32),
        _ => Err(Error::UnsupportedBitDepth(bits)),
    }
}

/// Interleaved samples as f32, ints scaled to ±1.
fn read_interleaved<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = full_scale(spec.bits_per_sample)?;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Read a WAV file as mono f32 samples along with the spec.
///
/// Multi-channel files are mixed down to mono by averaging channels.
///
/// # Example
/// ```ignore
/// let (samples, spec) = read_wav("input.wav")?;
/// println!("Loaded {} samples at {} Hz", samples.len(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));
    let samples = read_interleaved(reader)?;

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    tracing::debug!(
        frames = mono.len(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        "read wav"
    );
    Ok((mono, spec))
}

/// Write mono samples to a WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mono = WavSpec { channels: 1, ..spec };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(mono))?;

    if spec.bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = full_scale(spec.bits_per_sample)?;
        for &sample in samples {
            writer.write_sample((sample * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Read a WAV file as two channels.
///
/// Mono files are duplicated to both channels. Files with more than two
/// channels keep the first two.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoRender, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));
    let samples = read_interleaved(reader)?;

    let render = if channels == 1 {
        StereoRender::new(samples.clone(), samples)
    } else {
        let mut render = StereoRender::with_capacity(samples.len() / channels);
        for chunk in samples.chunks_exact(channels) {
            render.push(chunk[0], chunk[1]);
        }
        render
    };
    Ok((render, spec))
}

/// Write the odd/even pair to a two-channel WAV file.
///
/// `spec.channels` is ignored. Fails if the two channels differ in length.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    render: &StereoRender,
    spec: WavSpec,
) -> Result<()> {
    if render.odd.len() != render.even.len() {
        return Err(Error::ChannelMismatch {
            odd: render.odd.len(),
            even: render.even.len(),
        });
    }

    let stereo = WavSpec { channels: 2, ..spec };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(stereo))?;

    if spec.bits_per_sample == 32 {
        for (&l, &r) in render.odd.iter().zip(render.even.iter()) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }
    } else {
        let max_val = full_scale(spec.bits_per_sample)?;
        for (&l, &r) in render.odd.iter().zip(render.even.iter()) {
            writer.write_sample((l * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
            writer.write_sample((r * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
        }
    }

    writer.finalize()?;
    tracing::debug!(frames = render.len(), sample_rate = spec.sample_rate, "wrote wav");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mono_f32_file() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin()).collect();
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec, spec);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn test_i16_precision() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin() * 0.9).collect();
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        for (a, b) in samples.iter().zip(loaded.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_stereo_is_mixed_down() {
        let render = StereoRender::new(vec![1.0, 0.5], vec![0.0, -0.5]);
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &render, WavSpec::default()).unwrap();

        let (mono, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(mono, vec![0.5, 0.0]);
    }

    #[test]
    fn test_stereo_keeps_channels() {
        let render = StereoRender::new(vec![0.25, -0.75, 0.5], vec![-0.25, 0.75, 0.0]);
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &render, WavSpec::default()).unwrap();

        let (loaded, _) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded, render);
        assert_eq!(loaded.peak(), 0.75);
    }

    #[test]
    fn test_mono_read_as_stereo_duplicates() {
        let mono: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &mono, WavSpec::default()).unwrap();

        let (stereo, spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(spec.channels, 1);
        assert_eq!(stereo.odd, mono);
        assert_eq!(stereo.even, mono);
    }

    #[test]
    fn test_mismatched_channels_rejected() {
        let render = StereoRender::new(vec![0.0; 3], vec![0.0; 2]);
        let file = NamedTempFile::new().unwrap();
        let err = write_wav_stereo(file.path(), &render, WavSpec::default()).unwrap_err();
        assert!(matches!(err, Error::ChannelMismatch { odd: 3, even: 2 }));
    }

    #[test]
    fn test_full_scale() {
        assert_eq!(full_scale(16).unwrap(), 32768.0);
        assert_eq!(full_scale(24).unwrap(), 8_388_608.0);
        assert!(matches!(full_scale(0), Err(Error::UnsupportedBitDepth(0))));
    }
}
