//! Streaming sample-rate conversion between the host rate and the engine rate.
//!
//! [`SampleRateConverter`] is a band-limited interpolator that keeps its
//! history across calls, so a stream can be fed in arbitrarily sized chunks
//! and produce the same output as a single call over the whole stream. One
//! instance serves one direction of one signal; never share an instance
//! between the input and output paths.
//!
//! # Kernel
//!
//! Each output frame is a weighted sum of the `2 * HALF_WIDTH` surrounding
//! input frames using a Blackman-windowed sinc:
//!
//! ```text
//! h(x) = c · sinc(c · x) · w(x),    |x| < HALF_WIDTH
//! w(x) = 0.42 + 0.5·cos(πx / H) + 0.08·cos(2πx / H)
//! c    = min(1, ratio)
//! ```
//!
//! The cutoff `c` drops below 1 when decimating so the kernel also acts as
//! the anti-aliasing lowpass. The weights are normalised to unity DC gain.
//!
//! # Latency
//!
//! Output lags input by [`HALF_WIDTH`] input frames.
//!
//! # Example
//!
//! ```rust
//! use annuli_core::{MonoFrame, SampleRateConverter};
//!
//! let mut src = SampleRateConverter::<1>::new();
//! let input = [MonoFrame::mono(0.0); 44];
//! let mut output = [MonoFrame::mono(0.0); 24];
//!
//! let (consumed, produced) = src.process(&input, &mut output, 48000.0 / 44100.0);
//! assert!(consumed <= input.len());
//! assert!(produced <= output.len());
//! ```

use crate::Frame;
use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Number of input frames on each side of the interpolation point.
pub const HALF_WIDTH: usize = 8;

/// Total kernel length.
const TAPS: usize = 2 * HALF_WIDTH;

/// Streaming windowed-sinc resampler for `C`-channel frames.
#[derive(Debug, Clone)]
pub struct SampleRateConverter<const C: usize> {
    /// Last `TAPS` input frames, oldest first.
    history: [Frame<C>; TAPS],
    /// Read position between `history[HALF_WIDTH - 1]` and
    /// `history[HALF_WIDTH]`, in input frames. At or above 1.0 a new input
    /// frame must be shifted in before the next output.
    position: f64,
}

impl<const C: usize> SampleRateConverter<C> {
    /// Creates a converter with silent history.
    pub fn new() -> Self {
        Self {
            history: [Frame::SILENCE; TAPS],
            position: 1.0,
        }
    }

    /// Clears the history and read position.
    pub fn reset(&mut self) {
        self.history = [Frame::SILENCE; TAPS];
        self.position = 1.0;
    }

    /// Group delay in input frames.
    #[inline]
    pub const fn latency(&self) -> usize {
        HALF_WIDTH
    }

    /// Converts `input` into `output` at `ratio` (output rate / input rate).
    ///
    /// Returns `(consumed, produced)`. Conversion stops as soon as `output`
    /// is full or another input frame would be needed, so either count may
    /// fall short of the slice length; the caller must advance its buffers
    /// by exactly these amounts. Unconsumed input should be offered again on
    /// the next call.
    pub fn process(
        &mut self,
        input: &[Frame<C>],
        output: &mut [Frame<C>],
        ratio: f32,
    ) -> (usize, usize) {
        if !(ratio.is_finite() && ratio > 0.0) {
            return (0, 0);
        }
        let step = 1.0 / f64::from(ratio);
        let cutoff = ratio.min(1.0);
        let mut consumed = 0;
        let mut produced = 0;

        while produced < output.len() {
            while self.position >= 1.0 {
                let Some(&frame) = input.get(consumed) else {
                    return (consumed, produced);
                };
                self.shift_in(frame);
                consumed += 1;
                self.position -= 1.0;
            }
            output[produced] = self.interpolate(self.position as f32, cutoff);
            produced += 1;
            self.position += step;
        }
        (consumed, produced)
    }

    #[inline]
    fn shift_in(&mut self, frame: Frame<C>) {
        self.history.copy_within(1.., 0);
        self.history[TAPS - 1] = frame;
    }

    fn interpolate(&self, frac: f32, cutoff: f32) -> Frame<C> {
        if frac == 0.0 && cutoff >= 1.0 {
            return self.history[HALF_WIDTH - 1];
        }

        let mut weights = [0.0f32; TAPS];
        let mut total = 0.0f32;
        for (k, w) in weights.iter_mut().enumerate() {
            // Distance from the read point to tap k, in input frames.
            let x = (HALF_WIDTH - 1) as f32 + frac - k as f32;
            *w = kernel(x, cutoff);
            total += *w;
        }

        let mut out = Frame::SILENCE;
        if total.abs() < f32::EPSILON {
            return out;
        }
        let norm = 1.0 / total;
        for (frame, &w) in self.history.iter().zip(weights.iter()) {
            for (o, &s) in out.samples.iter_mut().zip(frame.samples.iter()) {
                *o += s * w * norm;
            }
        }
        out
    }
}

impl<const C: usize> Default for SampleRateConverter<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Blackman-windowed sinc evaluated at distance `x` with normalised cutoff `c`.
#[inline]
fn kernel(x: f32, c: f32) -> f32 {
    let h = HALF_WIDTH as f32;
    if x.abs() >= h {
        return 0.0;
    }
    let arg = PI * c * x;
    let sinc = if arg.abs() < 1e-6 { 1.0 } else { sinf(arg) / arg };
    let phase = PI * x / h;
    let window = 0.42 + 0.5 * cosf(phase) + 0.08 * cosf(2.0 * phase);
    c * sinc * window
}
