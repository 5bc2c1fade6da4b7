//! # Wii Remote Report Decoder
//!
//! Decodes input reports (status, read acknowledgements, button/sensor data)
//! into typed values.
//!
//! Decoding is total: unknown tags and undersized frames decode to
//! [`Report::Unsupported`] instead of an error, and no byte is ever indexed
//! beyond the length guaranteed by the tag's minimum size.
//!
//! ## IR Packing (basic mode, 10 bytes)
//!
//! ```text
//! Byte 6:  dot1.x[0:7]        Byte 11: dot3.x[0:7]
//! Byte 7:  dot1.y[0:7]        Byte 12: dot3.y[0:7]
//! Byte 8:  y1[8:9] x1[8:9] y2[8:9] x2[8:9]   (bits 7..0)
//! Byte 9:  dot2.x[0:7]        Byte 13: same layout for dots 3/4
//! Byte 10: dot2.y[0:7]        Byte 14: dot4.x[0:7], Byte 15: dot4.y[0:7]
//! ```

use tracing::trace;

use super::protocol::*;

/// Core button state.
///
/// Every flag is converted to `bool` here; raw bitmask values never leave
/// the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
    pub plus: bool,
    pub two: bool,
    pub one: bool,
    pub b: bool,
    pub a: bool,
    pub minus: bool,
    pub home: bool,
}

/// Raw accelerometer reading, one unsigned byte per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accelerometer {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl Default for Accelerometer {
    fn default() -> Self {
        Self {
            x: ACCEL_NEUTRAL,
            y: ACCEL_NEUTRAL,
            z: ACCEL_NEUTRAL,
        }
    }
}

/// One IR camera dot candidate (10-bit coordinates, 0-1023).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrDot {
    pub x: u16,
    pub y: u16,
    /// False when either coordinate carries the "no detection" sentinel.
    pub tracked: bool,
}

impl IrDot {
    /// Dot reported by the camera when nothing is detected.
    pub const UNTRACKED: IrDot = IrDot {
        x: IR_VALUE_MAX,
        y: IR_VALUE_MAX,
        tracked: false,
    };

    /// Creates a dot, deriving the tracked flag from the sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiiboard::wiimote::decoder::IrDot;
    ///
    /// assert!(IrDot::new(512, 384).tracked);
    /// assert!(!IrDot::new(1023, 1023).tracked);
    /// ```
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            tracked: x != IR_VALUE_MAX && y != IR_VALUE_MAX,
        }
    }
}

/// Orientation from the extension bytes (14-bit per axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub yaw: u16,
    pub roll: u16,
    pub pitch: u16,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            yaw: ORIENTATION_NEUTRAL,
            roll: ORIENTATION_NEUTRAL,
            pitch: ORIENTATION_NEUTRAL,
        }
    }
}

/// One decoded sensor frame.
///
/// Built fresh for every frame; shares nothing with other snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub buttons: Buttons,
    pub accel: Accelerometer,
    pub ir: [IrDot; 4],
    /// Present only on reports carrying extension data.
    pub orientation: Option<Orientation>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            buttons: Buttons::default(),
            accel: Accelerometer::default(),
            ir: [IrDot::UNTRACKED; 4],
            orientation: None,
        }
    }
}

impl Snapshot {
    /// The primary IR dot (used for pointing and calibration).
    #[must_use]
    pub fn dot1(&self) -> IrDot {
        self.ir[0]
    }

    /// Player LED bits of the currently tracked dots.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiiboard::wiimote::decoder::{IrDot, Snapshot};
    ///
    /// let mut snapshot = Snapshot::default();
    /// assert_eq!(snapshot.tracked_mask(), 0x00);
    ///
    /// snapshot.ir[0] = IrDot::new(100, 200);
    /// assert_eq!(snapshot.tracked_mask(), 0x10);
    /// ```
    #[must_use]
    pub fn tracked_mask(&self) -> u8 {
        self.ir
            .iter()
            .zip(LED_PLAYER)
            .filter(|(dot, _)| dot.tracked)
            .fold(0, |mask, (_, bit)| mask | bit)
    }
}

/// Battery status from a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    /// Battery level, 0-100
    pub battery_percent: u8,
    /// Battery nearly empty
    pub critical: bool,
}

/// A decoded input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Status(StatusInfo),
    ReadDataAck,
    Snapshot(Snapshot),
    Unsupported,
}

/// Decode a raw input report.
///
/// # Arguments
///
/// * `frame` - Report bytes, starting with the report tag
///
/// # Returns
///
/// * `Report` - Decoded report; [`Report::Unsupported`] for unknown tags and short frames
///
/// # Examples
///
/// ```
/// use wiiboard::wiimote::decoder::{decode_report, Report};
///
/// assert_eq!(decode_report(&[]), Report::Unsupported);
/// assert_eq!(decode_report(&[0x21]), Report::ReadDataAck);
/// ```
pub fn decode_report(frame: &[u8]) -> Report {
    let Some(&tag) = frame.first() else {
        return Report::Unsupported;
    };

    let report = match tag {
        INPUT_STATUS if frame.len() >= STATUS_REPORT_LEN => Report::Status(decode_status(frame)),
        INPUT_READ_DATA => Report::ReadDataAck,
        INPUT_BUTTONS if frame.len() >= BUTTONS_REPORT_LEN => Report::Snapshot(Snapshot {
            buttons: decode_buttons(frame),
            ..Snapshot::default()
        }),
        INPUT_BUTTONS_ACCEL if frame.len() >= BUTTONS_ACCEL_REPORT_LEN => {
            Report::Snapshot(Snapshot {
                buttons: decode_buttons(frame),
                accel: decode_accel(frame),
                ..Snapshot::default()
            })
        }
        INPUT_BUTTONS_ACCEL_IR if frame.len() >= BUTTONS_ACCEL_IR_REPORT_LEN => {
            Report::Snapshot(Snapshot {
                buttons: decode_buttons(frame),
                accel: decode_accel(frame),
                ir: decode_ir(frame),
                orientation: None,
            })
        }
        INPUT_BUTTONS_ACCEL_IR_EXT if frame.len() >= BUTTONS_ACCEL_IR_EXT_REPORT_LEN => {
            Report::Snapshot(Snapshot {
                buttons: decode_buttons(frame),
                accel: decode_accel(frame),
                ir: decode_ir(frame),
                orientation: Some(decode_orientation(frame)),
            })
        }
        _ => Report::Unsupported,
    };

    if report == Report::Unsupported {
        trace!("Unsupported report 0x{:02X} ({} bytes)", tag, frame.len());
    }

    report
}

/// Decode a status report. Caller guarantees `frame.len() >= STATUS_REPORT_LEN`.
fn decode_status(frame: &[u8]) -> StatusInfo {
    StatusInfo {
        battery_percent: (u16::from(frame[6]) * 100 / 255) as u8,
        critical: frame[3] & 0x01 != 0,
    }
}

/// Decode the two core button bytes (1 and 2).
fn decode_buttons(frame: &[u8]) -> Buttons {
    let b1 = frame[1];
    let b2 = frame[2];

    Buttons {
        left: b1 & 0x01 != 0,
        right: b1 & 0x02 != 0,
        down: b1 & 0x04 != 0,
        up: b1 & 0x08 != 0,
        plus: b1 & 0x10 != 0,
        two: b2 & 0x01 != 0,
        one: b2 & 0x02 != 0,
        b: b2 & 0x04 != 0,
        a: b2 & 0x08 != 0,
        minus: b2 & 0x10 != 0,
        home: b2 & 0x80 != 0,
    }
}

/// Decode accelerometer bytes 3-5.
fn decode_accel(frame: &[u8]) -> Accelerometer {
    Accelerometer {
        x: frame[3],
        y: frame[4],
        z: frame[5],
    }
}

/// Combine a low byte with two high bits taken from `shared` at `shift`.
#[inline]
fn ir_coordinate(low: u8, shared: u8, shift: u8) -> u16 {
    u16::from(low) | (u16::from((shared >> shift) & 0x03) << 8)
}

/// Decode the 10-byte basic IR block at bytes 6-15.
fn decode_ir(frame: &[u8]) -> [IrDot; 4] {
    let shared_12 = frame[8];
    let shared_34 = frame[13];

    [
        IrDot::new(
            ir_coordinate(frame[6], shared_12, 4),
            ir_coordinate(frame[7], shared_12, 6),
        ),
        IrDot::new(
            ir_coordinate(frame[9], shared_12, 0),
            ir_coordinate(frame[10], shared_12, 2),
        ),
        IrDot::new(
            ir_coordinate(frame[11], shared_34, 4),
            ir_coordinate(frame[12], shared_34, 6),
        ),
        IrDot::new(
            ir_coordinate(frame[14], shared_34, 0),
            ir_coordinate(frame[15], shared_34, 2),
        ),
    ]
}

/// Decode the 14-bit orientation triple from extension bytes 16-21.
fn decode_orientation(frame: &[u8]) -> Orientation {
    let axis = |low: u8, high: u8| u16::from(low) | (u16::from((high >> 2) & 0x3F) << 8);

    Orientation {
        yaw: axis(frame[16], frame[19]),
        roll: axis(frame[17], frame[20]),
        pitch: axis(frame[18], frame[21]),
    }
}
