//! Audio file I/O for offline annuli renders.
//!
//! - [`read_wav`] loads a file as mono for the module's audio input
//! - [`write_wav_stereo`] saves the odd/even output pair
//! - [`read_wav_stereo`] loads a two-channel file back for inspection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annuli_io::{StereoRender, WavSpec, read_wav, write_wav_stereo};
//!
//! let (input, spec) = read_wav("in.wav")?;
//! let render = StereoRender::new(input.clone(), input);
//! write_wav_stereo("out.wav", &render, WavSpec { channels: 2, ..spec })?;
//! # Ok::<(), annuli_io::Error>(())
//! ```

mod wav;

pub use wav::{StereoRender, WavSpec, read_wav, read_wav_stereo, write_wav, write_wav_stereo};

/// Error types for audio file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Odd and even channels differ in length.
    #[error("channel length mismatch: odd has {odd} samples, even has {even}")]
    ChannelMismatch {
        /// Samples in the odd channel.
        odd: usize,
        /// Samples in the even channel.
        even: usize,
    },

    /// The file uses a bit depth that cannot be represented.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),
}

/// Convenience result type for audio file operations.
pub type Result<T> = std::result::Result<T, Error>;
