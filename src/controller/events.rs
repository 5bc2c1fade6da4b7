//! # Controller Events and Commands
//!
//! Messages flowing out of the controller to its collaborators, and requests
//! flowing in.

use tokio::sync::mpsc::UnboundedSender;

/// Volume step per plus/minus press.
pub const VOLUME_STEP: i8 = 2;

/// Arrow direction from the D-pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Output event delivered to collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    /// The device stopped answering; the worker has exited
    Disconnected,
    /// Battery level from a status report
    StatusReport { battery_percent: u8, critical: bool },
    /// Laser overlay position, relative to the configured origin
    LaserPointer { visible: bool, x: i32, y: i32 },
    /// Number of calibration corners captured so far (0-4)
    CalibrationProgress { points: usize },
    /// Absolute screen position
    PointerMove { x: i32, y: i32 },
    PointerPress,
    PointerRelease,
    KeyPress(Direction),
    /// Volume change in percent points
    VolumeDelta(i8),
}

/// External request to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Start a new calibration, as if home had been pressed
    Calibrate,
    /// Resume tracking; ignored without a computed transform
    EnableTracking,
    /// Stop calibration or tracking and go idle
    Disable,
    /// `Disable` when tracking, `EnableTracking` otherwise
    ToggleTracking,
    /// Stop the worker without a `Disconnected` event
    Shutdown,
}

/// Sending half of the event channel.
///
/// Sends never fail from the controller's point of view: once the receiver
/// is gone, events are dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<ControllerEvent>,
}

impl EventSink {
    #[must_use]
    pub fn new(tx: UnboundedSender<ControllerEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: ControllerEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped, discarding {:?}", event);
        }
    }
}
