//! Annuli Platform - panel abstraction for the annuli resonator module
//!
//! This crate describes the module's physical surface independently of any
//! host: patchable jacks that either carry a voltage or are empty, output
//! jacks that know whether something is plugged into them, and the bicolor
//! lights that show the mode selectors.
//!
//! # Core Abstractions
//!
//! ## Jacks
//!
//! - [`InputJack`] - Control-voltage input with a connection flag and the
//!   [`normalize`](InputJack::normalize) contract
//! - [`OutputJack`] - Output voltage plus connection flag, driven from a
//!   normalized sample
//!
//! ## Indicators
//!
//! - [`BicolorLight`] - Green/red LED pair that encodes a three-position
//!   selector
//!
//! # Voltage Convention
//!
//! Audio and modulation signals use [`REFERENCE_VOLTAGE`] (5 V) as full
//! scale: an input of 5 V is 1.0 inside the engine, and an engine sample of
//! 1.0 leaves the module as 5 V.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! annuli-platform = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use annuli_platform::{InputJack, OutputJack};
//!
//! let pitch = InputJack::patched(1.5);
//! let fm = InputJack::unpatched();
//!
//! assert_eq!(pitch.normalize(0.0), 1.5);
//! assert_eq!(fm.normalize(1.0), 1.0);
//!
//! let mut out = OutputJack::patched();
//! out.drive(2.0);
//! assert_eq!(out.voltage, 5.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod jack;
pub mod light;

pub use jack::{InputJack, OutputJack};
pub use light::BicolorLight;

/// Full-scale voltage for audio and modulation signals.
pub const REFERENCE_VOLTAGE: f32 = 5.0;
