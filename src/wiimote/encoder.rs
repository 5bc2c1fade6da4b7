//! # Wii Remote Output Report Encoder
//!
//! Encodes host-to-device output reports (LEDs, report mode, IR camera,
//! register writes).

use super::protocol::*;

/// Encode a set-LEDs report.
///
/// # Arguments
///
/// * `leds` - LED/rumble bitmask
///
/// # Returns
///
/// * `Vec<u8>` - `[0x11, leds]`
pub fn encode_leds(leds: u8) -> Vec<u8> {
    vec![OUTPUT_LEDS, leds]
}

/// Encode a report-mode selection.
///
/// # Arguments
///
/// * `continuous` - Report continuously instead of only on change
/// * `report_type` - Input report tag to switch to (e.g. 0x37)
pub fn encode_report_mode(continuous: bool, report_type: u8) -> Vec<u8> {
    let flags = if continuous { REPORT_MODE_CONTINUOUS } else { 0x00 };
    vec![OUTPUT_REPORT_MODE, flags, report_type]
}

/// Encode both IR camera enable stages.
///
/// The camera needs both the 0x13 and the 0x1A report set to the same state.
///
/// # Returns
///
/// * `[Vec<u8>; 2]` - Stage 1 and stage 2 reports
pub fn encode_ir_enable(on: bool) -> [Vec<u8>; 2] {
    let state = if on { IR_STATE_ON } else { IR_STATE_OFF };
    [vec![OUTPUT_IR_ENABLE, state], vec![OUTPUT_IR_ENABLE_2, state]]
}

/// Encode a register write.
///
/// # Arguments
///
/// * `register` - 32-bit register address (sent big-endian)
/// * `payload` - Up to 16 bytes; longer payloads are truncated
///
/// # Returns
///
/// * `Vec<u8>` - 22 bytes: tag + address(4) + length(1) + payload zero-padded to 16
///
/// # Examples
///
/// ```
/// use wiiboard::wiimote::encoder::encode_register_write;
///
/// let report = encode_register_write(0x04A6_00FE, &[0x04]);
/// assert_eq!(&report[..7], &[0x16, 0x04, 0xA6, 0x00, 0xFE, 0x01, 0x04]);
/// assert_eq!(report.len(), 22);
/// ```
pub fn encode_register_write(register: u32, payload: &[u8]) -> Vec<u8> {
    let len = payload.len().min(REGISTER_PAYLOAD_SIZE);

    let mut report = Vec::with_capacity(1 + 4 + 1 + REGISTER_PAYLOAD_SIZE);
    report.push(OUTPUT_WRITE_MEMORY);
    report.extend_from_slice(&register.to_be_bytes());
    report.push(len as u8);
    report.extend_from_slice(&payload[..len]);
    report.resize(1 + 4 + 1 + REGISTER_PAYLOAD_SIZE, 0x00);

    report
}

/// Report mode used by the pointer loop: continuous buttons, accel, IR and extension.
pub fn encode_pointer_report_mode() -> Vec<u8> {
    encode_report_mode(true, INPUT_BUTTONS_ACCEL_IR_EXT)
}

/// Register write that re-arms the extension after it deactivates itself.
pub fn encode_extension_keepalive() -> Vec<u8> {
    encode_register_write(REG_MOTIONPLUS_INIT_2, &[MOTIONPLUS_INIT_2_VALUE])
}

/// Full startup sequence, in the order it must be written.
///
/// 1. Extension activation (two registers)
/// 2. IR camera enable (two stages)
/// 3. IR control, sensitivity blocks, IR mode, IR control again
/// 4. Continuous report mode 0x37
pub fn encode_initialization(sensitivity: IrSensitivity) -> Vec<Vec<u8>> {
    let [ir_stage_1, ir_stage_2] = encode_ir_enable(true);

    vec![
        encode_register_write(REG_MOTIONPLUS_INIT_1, &[MOTIONPLUS_INIT_1_VALUE]),
        encode_register_write(REG_MOTIONPLUS_INIT_2, &[MOTIONPLUS_INIT_2_VALUE]),
        ir_stage_1,
        ir_stage_2,
        encode_register_write(REG_IR, &[IR_CONTROL_ENABLE]),
        encode_register_write(REG_IR_SENSITIVITY_1, sensitivity.block1()),
        encode_register_write(REG_IR_SENSITIVITY_2, sensitivity.block2()),
        encode_register_write(REG_IR_MODE, &[IR_MODE_BASIC]),
        encode_register_write(REG_IR, &[IR_CONTROL_ENABLE]),
        encode_pointer_report_mode(),
    ]
}

/// Compute the LED byte for a tracked-dot mask.
///
/// The rumble bit is folded in and the result inverted, so lit LEDs mark
/// the dots that are *not* seen.
///
/// # Examples
///
/// ```
/// use wiiboard::wiimote::encoder::led_byte;
///
/// assert_eq!(led_byte(0x10), 0xEE);
/// ```
pub fn led_byte(tracked_mask: u8) -> u8 {
    0xFF - ((tracked_mask & 0xF0) + LED_RUMBLE)
}
