//! Reverb scratch arena.
//!
//! The engines keep their reverb and echo delay lines in a block of `u16`
//! words that the module allocates once and lends to whichever engine
//! renders the current block.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use crate::engine::REVERB_BUFFER_SIZE;
use crate::error::ModuleError;

/// Fixed-size `u16` arena shared by the engines.
///
/// # Example
///
/// ```rust
/// use annuli_module::{ModuleError, REVERB_BUFFER_SIZE, ScratchBuffer};
///
/// let scratch = ScratchBuffer::new();
/// assert_eq!(scratch.len(), REVERB_BUFFER_SIZE);
///
/// let err = ScratchBuffer::from_vec(vec![0; 16]).unwrap_err();
/// assert!(matches!(err, ModuleError::ScratchTooSmall { actual: 16, .. }));
/// ```
#[derive(Debug, Clone)]
pub struct ScratchBuffer {
    data: Box<[u16]>,
}

impl ScratchBuffer {
    /// Allocates a zeroed arena of [`REVERB_BUFFER_SIZE`] elements.
    pub fn new() -> Self {
        Self {
            data: vec![0; REVERB_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Takes ownership of caller-provided storage.
    ///
    /// Fails if `data` is shorter than [`REVERB_BUFFER_SIZE`].
    pub fn from_vec(data: Vec<u16>) -> Result<Self, ModuleError> {
        if data.len() < REVERB_BUFFER_SIZE {
            return Err(ModuleError::ScratchTooSmall {
                required: REVERB_BUFFER_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Length in elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the arena has no elements. Never the case once constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lends the arena to an engine for one block.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// Zeroes the arena.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}
