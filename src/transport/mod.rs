//! # Device Transport Module
//!
//! Frame-level I/O with the Wii Remote.
//!
//! This module handles:
//! - The [`Transport`] trait (bounded-wait frame reads, report writes)
//! - Writing the startup register sequence
//! - The hidapi-backed transport ([`hid::HidTransport`])

pub mod hid;

use tracing::debug;

use crate::error::Result;
use crate::wiimote::encoder::encode_initialization;
use crate::wiimote::protocol::IrSensitivity;

/// Trait for frame I/O with the device, to enable testing without hardware
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send {
    /// Read one input report into `buf`.
    ///
    /// Blocks for at most `timeout_ms` milliseconds. Returns `Ok(0)` when no
    /// report arrived in time; an error means the device is gone.
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;

    /// Write one output report (tag byte first).
    fn write(&mut self, report: &[u8]) -> Result<()>;
}

/// Write the startup sequence: extension activation, IR camera setup and
/// continuous report mode.
///
/// # Errors
///
/// Returns the first write error; later reports are not sent.
pub fn initialize(transport: &mut dyn Transport, sensitivity: IrSensitivity) -> Result<()> {
    for report in encode_initialization(sensitivity) {
        transport.write(&report)?;
    }

    debug!("Device initialized (IR sensitivity {:?})", sensitivity);
    Ok(())
}
