//! # LED Feedback
//!
//! Shows on the player LEDs which IR dots the camera currently sees.

use tracing::debug;

use crate::wiimote::encoder::{encode_leds, led_byte};

/// Remembers the last tracked-dot mask sent to the device.
#[derive(Debug, Clone, Default)]
pub struct DeviceFeedback {
    last_mask: u8,
}

impl DeviceFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the LED report to write if `tracked_mask` differs from the
    /// previous call, or `None` when nothing changed.
    pub fn update(&mut self, tracked_mask: u8) -> Option<Vec<u8>> {
        if tracked_mask == self.last_mask {
            return None;
        }

        self.last_mask = tracked_mask;
        let leds = led_byte(tracked_mask);
        debug!("Tracked dots {:#04x}, LEDs {:#04x}", tracked_mask, leds);
        Some(encode_leds(leds))
    }

    #[must_use]
    pub fn last_mask(&self) -> u8 {
        self.last_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dot_led_byte() {
        let mut feedback = DeviceFeedback::new();
        assert_eq!(feedback.update(0x10), Some(vec![0x11, 0xEE]));
    }

    #[test]
    fn test_unchanged_mask_writes_nothing() {
        let mut feedback = DeviceFeedback::new();
        assert!(feedback.update(0x00).is_none());

        feedback.update(0x30);
        assert!(feedback.update(0x30).is_none());
        assert_eq!(feedback.last_mask(), 0x30);
    }

    #[test]
    fn test_losing_dots_writes_again() {
        let mut feedback = DeviceFeedback::new();
        feedback.update(0xF0);
        assert_eq!(feedback.update(0x00), Some(vec![0x11, 0xFE]));
    }
}
