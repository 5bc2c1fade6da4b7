//! # Wii Remote Protocol Constants and Types
//!
//! Core protocol definitions for Wii Remote HID communication.

use serde::{Deserialize, Serialize};

/// Nintendo vendor ID
pub const NINTENDO_VENDOR_ID: u16 = 0x057e;

/// Supported product IDs: original Wii Remote (and early Plus), later Wii Remote Plus
pub const WIIMOTE_PRODUCT_IDS: &[u16] = &[0x0306, 0x0330];

/// Largest input report the device sends
pub const MAX_REPORT_SIZE: usize = 64;

// -- Output report tags (host to device) --

/// Set player LEDs and rumble
pub const OUTPUT_LEDS: u8 = 0x11;
/// Select input report mode
pub const OUTPUT_REPORT_MODE: u8 = 0x12;
/// IR camera enable, stage 1
pub const OUTPUT_IR_ENABLE: u8 = 0x13;
/// Write device memory/register
pub const OUTPUT_WRITE_MEMORY: u8 = 0x16;
/// IR camera enable, stage 2
pub const OUTPUT_IR_ENABLE_2: u8 = 0x1A;

// -- Input report tags (device to host) --

/// Status information (battery, extension, LEDs)
pub const INPUT_STATUS: u8 = 0x20;
/// Memory read result
pub const INPUT_READ_DATA: u8 = 0x21;
/// Core buttons only
pub const INPUT_BUTTONS: u8 = 0x30;
/// Core buttons and accelerometer
pub const INPUT_BUTTONS_ACCEL: u8 = 0x31;
/// Core buttons, accelerometer and 10 IR bytes (basic mode)
pub const INPUT_BUTTONS_ACCEL_IR: u8 = 0x33;
/// Core buttons, accelerometer, 10 IR bytes and 6 extension bytes
pub const INPUT_BUTTONS_ACCEL_IR_EXT: u8 = 0x37;

/// Report mode flag: send reports continuously rather than on change
pub const REPORT_MODE_CONTINUOUS: u8 = 0x04;

/// Minimum frame sizes per input report tag (tag byte included)
pub const STATUS_REPORT_LEN: usize = 7;
pub const BUTTONS_REPORT_LEN: usize = 3;
pub const BUTTONS_ACCEL_REPORT_LEN: usize = 6;
pub const BUTTONS_ACCEL_IR_REPORT_LEN: usize = 16;
pub const BUTTONS_ACCEL_IR_EXT_REPORT_LEN: usize = 22;

// -- Registers --

/// IR camera control register
pub const REG_IR: u32 = 0x04B0_0030;
/// IR sensitivity block 1 (9 bytes)
pub const REG_IR_SENSITIVITY_1: u32 = 0x04B0_0000;
/// IR sensitivity block 2 (2 bytes)
pub const REG_IR_SENSITIVITY_2: u32 = 0x04B0_001A;
/// IR output mode register
pub const REG_IR_MODE: u32 = 0x04B0_0033;
/// Extension activation register 1
pub const REG_MOTIONPLUS_INIT_1: u32 = 0x04A6_00F0;
/// Extension activation register 2, also the keep-alive target
pub const REG_MOTIONPLUS_INIT_2: u32 = 0x04A6_00FE;

/// Value written to [`REG_MOTIONPLUS_INIT_1`]
pub const MOTIONPLUS_INIT_1_VALUE: u8 = 0x55;
/// Value written to [`REG_MOTIONPLUS_INIT_2`]
pub const MOTIONPLUS_INIT_2_VALUE: u8 = 0x04;
/// Value written to [`REG_IR`] to enable the camera
pub const IR_CONTROL_ENABLE: u8 = 0x08;

/// Register write payload length (zero padded)
pub const REGISTER_PAYLOAD_SIZE: usize = 16;

// -- IR camera --

/// IR camera state: off
pub const IR_STATE_OFF: u8 = 0x00;
/// IR camera state: on
pub const IR_STATE_ON: u8 = 0x04;

/// IR output mode: position of up to 4 dots
pub const IR_MODE_BASIC: u8 = 0x01;

/// Largest IR coordinate; also the "no detection" sentinel
pub const IR_VALUE_MAX: u16 = 1023;

/// Neutral accelerometer reading per axis
pub const ACCEL_NEUTRAL: u8 = 0x80;

/// Neutral orientation reading per axis (14-bit)
pub const ORIENTATION_NEUTRAL: u16 = 0x1F7F;

// -- LEDs --

/// Rumble bit, shared with the LED byte
pub const LED_RUMBLE: u8 = 0x01;
/// Player LED bits, one per IR dot
pub const LED_PLAYER: [u8; 4] = [0x10, 0x20, 0x40, 0x80];

/// IR camera sensitivity preset.
///
/// Each preset is written as two register blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrSensitivity {
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    #[default]
    Max,
}

impl IrSensitivity {
    /// Register block written to [`REG_IR_SENSITIVITY_1`]
    pub fn block1(self) -> &'static [u8] {
        match self {
            IrSensitivity::Level1 => &[0x02, 0x00, 0x00, 0x71, 0x01, 0x00, 0x64, 0x00, 0xfe],
            IrSensitivity::Level2 => &[0x02, 0x00, 0x00, 0x71, 0x01, 0x00, 0x96, 0x00, 0xb4],
            IrSensitivity::Level3 => &[0x02, 0x00, 0x00, 0x71, 0x01, 0x00, 0xaa, 0x00, 0x64],
            IrSensitivity::Level4 => &[0x02, 0x00, 0x00, 0x71, 0x01, 0x00, 0xc8, 0x00, 0x36],
            IrSensitivity::Level5 => &[0x07, 0x00, 0x00, 0x71, 0x01, 0x00, 0x72, 0x00, 0x20],
            IrSensitivity::Max => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x90, 0x00, 0x41],
        }
    }

    /// Register block written to [`REG_IR_SENSITIVITY_2`]
    pub fn block2(self) -> &'static [u8] {
        match self {
            IrSensitivity::Level1 => &[0xfd, 0x05],
            IrSensitivity::Level2 => &[0xb3, 0x04],
            IrSensitivity::Level3 => &[0x63, 0x03],
            IrSensitivity::Level4 => &[0x35, 0x03],
            IrSensitivity::Level5 => &[0x1f, 0x03],
            IrSensitivity::Max => &[0x40, 0x00],
        }
    }
}
