//! Multi-channel sample frames.
//!
//! A [`Frame`] holds one time-step's worth of samples across `C` channels.
//! Frames are plain values: they are copied into queues, through the rate
//! converter, and out to the host without any identity of their own.

/// One time-step of `C` channels.
///
/// # Example
///
/// ```rust
/// use annuli_core::Frame;
///
/// let f = Frame::stereo(0.25, -0.5);
/// assert_eq!(f.samples, [0.25, -0.5]);
/// assert_eq!(f.sum(), -0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<const C: usize> {
    /// Per-channel samples.
    pub samples: [f32; C],
}

/// Single-channel frame.
pub type MonoFrame = Frame<1>;

/// Two-channel frame.
pub type StereoFrame = Frame<2>;

impl<const C: usize> Frame<C> {
    /// Silent frame (all channels zero).
    pub const SILENCE: Self = Self { samples: [0.0; C] };

    /// Creates a frame from per-channel samples.
    #[inline]
    pub const fn new(samples: [f32; C]) -> Self {
        Self { samples }
    }

    /// Number of channels.
    #[inline]
    pub const fn channels(&self) -> usize {
        C
    }

    /// Sum of all channels.
    #[inline]
    pub fn sum(&self) -> f32 {
        self.samples.iter().sum()
    }
}

impl Frame<1> {
    /// Creates a single-channel frame.
    #[inline]
    pub const fn mono(sample: f32) -> Self {
        Self { samples: [sample] }
    }
}

impl Frame<2> {
    /// Creates a two-channel frame.
    #[inline]
    pub const fn stereo(first: f32, second: f32) -> Self {
        Self {
            samples: [first, second],
        }
    }
}

impl<const C: usize> Default for Frame<C> {
    fn default() -> Self {
        Self::SILENCE
    }
}
