//! Annuli Module - the resonator module's block scheduler
//!
//! This crate sits between a host that calls once per sample at any rate and
//! a synthesis engine that renders fixed 24-sample blocks at 48 kHz. It owns
//! the buffering, rate conversion, control shaping and mode logic; the
//! synthesis itself is supplied through the [`Resonator`] and
//! [`StringSynth`] traits.
//!
//! # Core Abstractions
//!
//! ## Scheduling
//!
//! - [`Annuli`] - Per-tick orchestrator: queues, converters, engine calls,
//!   output routing
//! - [`ScratchBuffer`] - Reverb arena lent to the engines
//!
//! ## Engine Boundary
//!
//! - [`Resonator`] / [`StringSynth`] - Engine traits
//! - [`Patch`] / [`PerformanceState`] - Per-block engine input
//! - [`ResonatorModel`] / [`FxType`] - Engine selectors
//!
//! ## Controls
//!
//! - [`Knobs`] / [`Jacks`] / [`Outputs`] - Panel state
//! - [`shaper`] - Knob + CV → parameter functions
//! - [`ModeSelector`] / [`ModeSnapshot`] / [`SharedModeState`] - Polyphony,
//!   model and easter-egg selection
//! - [`Strummer`] - Internal strum detection
//!
//! ## Reference Engine
//!
//! - [`reference::PluckedStrings`] - Karplus–Strong string bank implementing
//!   both engine traits
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for the queues and the
//! scratch arena). Everything is allocated at construction.
//!
//! ```toml
//! [dependencies]
//! annuli-module = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use annuli_module::{Annuli, Jacks, Knobs, Outputs, reference::PluckedStrings};
//! use annuli_platform::InputJack;
//!
//! let mut module = Annuli::new(PluckedStrings::new(), PluckedStrings::new())?;
//! let knobs = Knobs::default();
//! let jacks = Jacks {
//!     pitch: InputJack::patched(1.0),
//!     ..Jacks::default()
//! };
//! let mut outputs = Outputs::mono();
//!
//! for _ in 0..44100 {
//!     module.process(&knobs, &jacks, &mut outputs, 44100.0);
//! }
//! assert_eq!(outputs.odd.voltage, outputs.even.voltage);
//! # Ok::<(), annuli_module::ModuleError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod builder;
pub mod controls;
pub mod engine;
pub mod error;
pub mod mode;
pub mod module;
pub mod reference;
pub mod scratch;
pub mod shaper;
pub mod strummer;

pub use builder::{build_patch, build_performance};
pub use controls::{Jacks, Knobs, Outputs};
pub use engine::{
    BLOCK_SIZE, ENGINE_SAMPLE_RATE, FxType, MAX_POLYPHONY, NUM_CHORDS, Patch, PerformanceState,
    REVERB_BUFFER_SIZE, Resonator, ResonatorModel, StringSynth,
};
pub use error::ModuleError;
pub use mode::{Lights, ModeChanges, ModeSelector, ModeSnapshot, SharedModeState};
pub use module::{Annuli, QUEUE_CAPACITY, STRUM_THRESHOLD};
pub use scratch::ScratchBuffer;
pub use strummer::{OnsetDetector, Strummer};
