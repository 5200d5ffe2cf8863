//! Bicolor indicator LEDs.

/// A green/red LED pair.
///
/// Three selector positions are shown with two LEDs: position 0 lights
/// green, position 2 lights red, and position 1 lights both (amber).
///
/// # Example
///
/// ```rust
/// use annuli_platform::BicolorLight;
///
/// assert_eq!(BicolorLight::from_position(0), BicolorLight { green: 1.0, red: 0.0 });
/// assert_eq!(BicolorLight::from_position(1), BicolorLight { green: 1.0, red: 1.0 });
/// assert_eq!(BicolorLight::from_position(2), BicolorLight { green: 0.0, red: 1.0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BicolorLight {
    /// Green brightness, 0.0 to 1.0.
    pub green: f32,
    /// Red brightness, 0.0 to 1.0.
    pub red: f32,
}

impl BicolorLight {
    /// Both LEDs off.
    pub const OFF: Self = Self {
        green: 0.0,
        red: 0.0,
    };

    /// Encodes a selector position in `0..=2`.
    ///
    /// Positions above 2 light nothing.
    #[inline]
    pub const fn from_position(position: u8) -> Self {
        Self {
            green: if position <= 1 { 1.0 } else { 0.0 },
            red: if matches!(position, 1 | 2) { 1.0 } else { 0.0 },
        }
    }

    /// True if either LED is lit.
    #[inline]
    pub fn is_lit(&self) -> bool {
        self.green > 0.0 || self.red > 0.0
    }
}
