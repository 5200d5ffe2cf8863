//! Construction errors.
//!
//! Everything that can go wrong is checked before the first tick; the
//! per-sample path has no error returns.

/// Error returned when a module cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleError {
    /// The reverb scratch arena is shorter than the engines require.
    ScratchTooSmall {
        /// Minimum length in elements.
        required: usize,
        /// Length supplied.
        actual: usize,
    },
    /// An engine reported a block size other than the module's.
    InvalidBlockSize {
        /// Block size the module runs at.
        expected: usize,
        /// Block size the engine reported.
        actual: usize,
    },
}

impl core::fmt::Display for ModuleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ScratchTooSmall { required, actual } => write!(
                f,
                "scratch buffer holds {actual} elements, engine needs at least {required}"
            ),
            Self::InvalidBlockSize { expected, actual } => {
                write!(f, "engine block size is {actual}, expected {expected}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ModuleError {}
