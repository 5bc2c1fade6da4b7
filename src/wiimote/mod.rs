//! # Wii Remote Protocol Module
//!
//! Implementation of the Wii Remote HID report protocol.
//!
//! This module handles:
//! - Input report decoding (status, buttons, accelerometer, IR dots, orientation)
//! - Output report encoding (LEDs, report mode, IR camera, register writes)
//! - Protocol constants (report tags, registers, IR sensitivity presets)

pub mod protocol;
pub mod decoder;
pub mod encoder;
