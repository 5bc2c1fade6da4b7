//! # Laser Pointer
//!
//! Turns the extension's yaw/pitch readings into an overlay offset while A
//! or B is held.

use crate::wiimote::decoder::Orientation;

/// Default yaw reading for a remote pointed at the screen centre.
pub const DEFAULT_YAW_ORIGIN: i32 = 8175;
/// Default pitch reading for a remote pointed at the screen centre.
pub const DEFAULT_PITCH_ORIGIN: i32 = 8140;
/// Default pixels per orientation step.
pub const DEFAULT_FACTOR: f64 = 0.02;

/// Orientation-to-offset mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserPointer {
    pub yaw_origin: i32,
    pub pitch_origin: i32,
    pub factor: f64,
}

impl Default for LaserPointer {
    fn default() -> Self {
        Self {
            yaw_origin: DEFAULT_YAW_ORIGIN,
            pitch_origin: DEFAULT_PITCH_ORIGIN,
            factor: DEFAULT_FACTOR,
        }
    }
}

impl LaserPointer {
    #[must_use]
    pub fn new(yaw_origin: i32, pitch_origin: i32, factor: f64) -> Self {
        Self {
            yaw_origin,
            pitch_origin,
            factor,
        }
    }

    /// Offset from the origin, truncated toward zero.
    ///
    /// Pitch is inverted so tilting up moves the overlay up. Reports without
    /// orientation data use the neutral reading.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiiboard::controller::laser::LaserPointer;
    /// use wiiboard::wiimote::decoder::Orientation;
    ///
    /// let laser = LaserPointer::default();
    /// let orientation = Orientation { yaw: 8275, roll: 0, pitch: 8240 };
    /// assert_eq!(laser.offset(Some(orientation)), (2, -2));
    /// ```
    #[must_use]
    pub fn offset(&self, orientation: Option<Orientation>) -> (i32, i32) {
        let orientation = orientation.unwrap_or_default();

        let yaw = f64::from(orientation.yaw) - f64::from(self.yaw_origin);
        let pitch = f64::from(orientation.pitch) - f64::from(self.pitch_origin);

        ((yaw * self.factor) as i32, (pitch * -self.factor) as i32)
    }
}
