//! Annuli Core - real-time primitives for the annuli resonator module
//!
//! This crate provides the building blocks that sit between a host running
//! at an arbitrary sample rate and a block-based engine running at a fixed
//! internal rate. Nothing here allocates after construction.
//!
//! # Core Abstractions
//!
//! ## Frames and Buffering
//!
//! - [`Frame`] - One time-step of `C` channels ([`MonoFrame`], [`StereoFrame`])
//! - [`FrameQueue`] - Bounded FIFO with contiguous read/write windows
//!
//! ## Rate Conversion
//!
//! - [`SampleRateConverter`] - Streaming windowed-sinc resampler that reports
//!   exactly how many frames it consumed and produced
//!
//! ## Control
//!
//! - [`SchmittTrigger`] - Hysteresis edge detector for buttons and gates
//! - [`EnvelopeFollower`] - Attack/release amplitude tracker
//! - [`quadratic_bipolar`] / [`quartic_bipolar`] - Attenuverter response curves
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for queue storage).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! annuli-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use annuli_core::{FrameQueue, MonoFrame, SampleRateConverter};
//!
//! let mut queue: FrameQueue<MonoFrame, 256> = FrameQueue::new();
//! let mut src = SampleRateConverter::<1>::new();
//!
//! for i in 0..64 {
//!     if !queue.is_full() {
//!         queue.push(MonoFrame::mono(i as f32 * 0.01));
//!     }
//! }
//!
//! let mut block = [MonoFrame::SILENCE; 24];
//! let (consumed, _produced) = src.process(queue.peek(), &mut block, 48000.0 / 44100.0);
//! queue.advance(consumed);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod envelope;
pub mod frame;
pub mod frame_queue;
pub mod math;
pub mod resample;
pub mod trigger;

pub use envelope::EnvelopeFollower;
pub use frame::{Frame, MonoFrame, StereoFrame};
pub use frame_queue::{FrameQueue, FrameQueueError};
pub use math::{clamp, flush_denormal, lerp, quadratic_bipolar, quartic_bipolar, semitones_to_ratio};
pub use resample::{HALF_WIDTH, SampleRateConverter};
pub use trigger::{SchmittTrigger, TriggerState};
