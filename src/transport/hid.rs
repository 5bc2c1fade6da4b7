//! # HID Transport
//!
//! Wii Remote connection through hidapi (hidraw on Linux).

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use super::Transport;
use crate::error::{Result, WiiboardError};
use crate::wiimote::protocol::{NINTENDO_VENDOR_ID, WIIMOTE_PRODUCT_IDS};

/// Open HID connection to a Wii Remote.
pub struct HidTransport {
    device: HidDevice,
    product: String,
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport")
            .field("product", &self.product)
            .finish_non_exhaustive()
    }
}

impl HidTransport {
    /// Open the first connected Wii Remote.
    ///
    /// Tries each known product ID in order.
    ///
    /// # Errors
    ///
    /// - `Hid`: the HID backend could not be initialized
    /// - `DeviceNotFound`: no supported device is connected
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wiiboard::transport::hid::HidTransport;
    ///
    /// let transport = HidTransport::open()?;
    /// println!("Connected to {}", transport.product());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let api = HidApi::new()?;

        for &product_id in WIIMOTE_PRODUCT_IDS {
            debug!(
                "Trying HID device {:04x}:{:04x}",
                NINTENDO_VENDOR_ID, product_id
            );

            match api.open(NINTENDO_VENDOR_ID, product_id) {
                Ok(device) => {
                    let product = device
                        .get_product_string()
                        .ok()
                        .flatten()
                        .unwrap_or_else(|| "Wii Remote".to_string());
                    let serial = device
                        .get_serial_number_string()
                        .ok()
                        .flatten()
                        .unwrap_or_default();

                    info!("Connected to: {}, Serial: {}", product, serial);
                    return Ok(Self { device, product });
                }
                Err(e) => {
                    debug!("Could not open {:04x}:{:04x}: {}", NINTENDO_VENDOR_ID, product_id, e);
                }
            }
        }

        Err(WiiboardError::DeviceNotFound)
    }

    /// Product name reported by the device
    pub fn product(&self) -> &str {
        &self.product
    }
}

impl Transport for HidTransport {
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| WiiboardError::Transport(format!("read failed: {}", e)))
    }

    fn write(&mut self, report: &[u8]) -> Result<()> {
        self.device
            .write(report)
            .map_err(|e| WiiboardError::Transport(format!("write failed: {}", e)))?;
        Ok(())
    }
}
