//! Persisted mode state for the annuli resonator module.
//!
//! A host saves three values with each patch: the polyphony position, the
//! resonator model and the easter-egg flag. This crate reads and writes them
//! as the host's JSON document or as a TOML state file, and converts them to
//! and from the module's [`ModeSnapshot`](annuli_module::ModeSnapshot).
//!
//! Loading never fails on values that are merely out of range: they are
//! replaced by defaults when converted to a snapshot, with a warning.
//!
//! # Example
//!
//! ```rust,no_run
//! use annuli_config::ModuleState;
//!
//! let state = ModuleState::load("patch.json")?;
//! let mode = state.to_snapshot();
//! ModuleState::from(mode).save("backup/patch.toml")?;
//! # Ok::<(), annuli_config::ConfigError>(())
//! ```

mod error;
mod state;

pub use error::ConfigError;
pub use state::{ModuleState, StateFormat};
