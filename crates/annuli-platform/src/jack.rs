//! Patchable input and output jacks.
//!
//! A jack either has a cable in it or it doesn't, and the module behaves
//! differently in each case: an empty pitch input falls back to a default
//! note, an empty exciter input switches the engine to its internal exciter,
//! and a single patched output receives the mono sum of both channels.

use crate::REFERENCE_VOLTAGE;
use annuli_core::clamp;

/// A control-voltage input.
///
/// # Example
///
/// ```rust
/// use annuli_platform::InputJack;
///
/// let jack = InputJack::patched(-2.0);
/// assert!(jack.connected);
/// assert_eq!(jack.normalize(0.0), -2.0);
///
/// let empty = InputJack::unpatched();
/// assert_eq!(empty.normalize(3.0), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputJack {
    /// Voltage present on the jack. Meaningless while unpatched.
    pub value: f32,
    /// True if a cable is plugged in.
    pub connected: bool,
}

impl InputJack {
    /// A jack carrying `value` volts.
    #[inline]
    pub const fn patched(value: f32) -> Self {
        Self {
            value,
            connected: true,
        }
    }

    /// An empty jack.
    #[inline]
    pub const fn unpatched() -> Self {
        Self {
            value: 0.0,
            connected: false,
        }
    }

    /// The patched voltage, or `default` if nothing is plugged in.
    #[inline]
    pub fn normalize(&self, default: f32) -> f32 {
        if self.connected { self.value } else { default }
    }

    /// Updates the voltage and marks the jack as patched.
    #[inline]
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.connected = true;
    }

    /// Removes the cable.
    #[inline]
    pub fn unplug(&mut self) {
        self.value = 0.0;
        self.connected = false;
    }
}

/// An output jack.
///
/// The host sets [`connected`](Self::connected) to reflect the patch; the
/// module writes [`voltage`](Self::voltage). A voltage is held until the next
/// write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputJack {
    /// Voltage currently presented on the jack.
    pub voltage: f32,
    /// True if a cable is plugged in.
    pub connected: bool,
}

impl OutputJack {
    /// A patched jack at 0 V.
    #[inline]
    pub const fn patched() -> Self {
        Self {
            voltage: 0.0,
            connected: true,
        }
    }

    /// An empty jack at 0 V.
    #[inline]
    pub const fn unpatched() -> Self {
        Self {
            voltage: 0.0,
            connected: false,
        }
    }

    /// Presents a normalized sample, clipped to ±1 and scaled to ±[`REFERENCE_VOLTAGE`].
    #[inline]
    pub fn drive(&mut self, sample: f32) {
        self.voltage = clamp(sample, -1.0, 1.0) * REFERENCE_VOLTAGE;
    }

    /// The voltage expressed back in normalized units.
    #[inline]
    pub fn sample(&self) -> f32 {
        self.voltage / REFERENCE_VOLTAGE
    }
}
