//! # Controller State Machine
//!
//! Drives calibration capture and live pointer tracking from decoded reports.
//!
//! ## Modes
//!
//! ```text
//!            home / Calibrate               4 corners computed
//!   Idle ───────────────────► Calibrating ─────────────────────► Tracking
//!    ▲                            │  ▲                              │
//!    │          Disable           │  └──────── home / Calibrate ────┘
//!    └────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! The controller never touches the device directly. Each processed report
//! returns the output reports (LEDs, keep-alives) that the worker must write
//! before its next read.

use tracing::{debug, error, info, warn};

use super::events::{ControllerCommand, ControllerEvent, EventSink};
use super::feedback::DeviceFeedback;
use super::laser::LaserPointer;
use super::rules::{evaluate, Decision};
use super::smoothing::{SmoothingFilter, DEFAULT_SMOOTHING};
use crate::error::Result;
use crate::geometry::perspective::{PerspectiveTransform, Point, Quad};
use crate::wiimote::decoder::{IrDot, Report, Snapshot, StatusInfo};
use crate::wiimote::encoder::{encode_extension_keepalive, encode_pointer_report_mode};

/// Default fraction of the screen left uncovered by the calibration targets.
pub const CALIBRATION_MARGIN: f64 = 0.05;

/// Number of corners in a calibration.
pub const CALIBRATION_POINTS: usize = 4;

/// Persistence for completed calibrations.
#[cfg_attr(test, mockall::automock)]
pub trait CalibrationStore: Send {
    /// Store the camera-space quad (top-left, top-right, bottom-left, bottom-right).
    fn save(&mut self, quad: &Quad) -> Result<()>;
}

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerMode {
    #[default]
    Idle,
    Calibrating,
    Tracking,
}

/// Everything the controller needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Inset of the calibration targets, as a fraction of each side
    pub margin: f64,
    /// Smoothing history length
    pub smoothing: usize,
    pub laser: LaserPointer,
    /// Previously saved camera-space quad
    pub calibration: Option<Quad>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            margin: CALIBRATION_MARGIN,
            smoothing: DEFAULT_SMOOTHING,
            laser: LaserPointer::default(),
            calibration: None,
        }
    }
}

/// Last pointer position and button state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    pub position: Option<(i32, i32)>,
    pub pressed: bool,
}

/// Mode state machine for one device.
pub struct Controller {
    mode: ControllerMode,
    previous: Snapshot,
    calibration: Vec<Point>,
    transform: PerspectiveTransform,
    smoothing: SmoothingFilter,
    pointer: PointerState,
    laser: LaserPointer,
    feedback: DeviceFeedback,
    screen_width: u32,
    screen_height: u32,
    store: Box<dyn CalibrationStore>,
    events: EventSink,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.mode)
            .field("calibration", &self.calibration)
            .field("pointer", &self.pointer)
            .field("computed", &self.transform.is_computed())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a controller.
    ///
    /// Starts in `Tracking` if `settings.calibration` yields a valid
    /// transform, otherwise in `Idle`.
    pub fn new(settings: ControllerSettings, store: Box<dyn CalibrationStore>, events: EventSink) -> Self {
        let destination = Quad::inset_rectangle(
            f64::from(settings.screen_width),
            f64::from(settings.screen_height),
            settings.margin,
        );

        let mut controller = Self {
            mode: ControllerMode::Idle,
            previous: Snapshot::default(),
            calibration: Vec::with_capacity(CALIBRATION_POINTS),
            transform: PerspectiveTransform::new(Quad::default(), destination),
            smoothing: SmoothingFilter::new(settings.smoothing),
            pointer: PointerState::default(),
            laser: settings.laser,
            feedback: DeviceFeedback::new(),
            screen_width: settings.screen_width,
            screen_height: settings.screen_height,
            store,
            events,
        };

        if let Some(quad) = settings.calibration {
            match controller.transform.replace_source(quad) {
                Ok(()) => {
                    info!("Loaded saved calibration");
                    controller.set_mode(ControllerMode::Tracking);
                }
                Err(e) => warn!("Ignoring saved calibration: {}", e),
            }
        }

        controller
    }

    #[must_use]
    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    /// Corners captured in the current calibration
    #[must_use]
    pub fn calibration_points(&self) -> &[Point] {
        &self.calibration
    }

    #[must_use]
    pub fn transform(&self) -> &PerspectiveTransform {
        &self.transform
    }

    #[must_use]
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Processes one decoded report and returns the output reports to write.
    pub fn handle_report(&mut self, report: Report) -> Vec<Vec<u8>> {
        match report {
            Report::Status(status) => self.handle_status(status),
            Report::ReadDataAck => vec![encode_extension_keepalive()],
            Report::Snapshot(snapshot) => self.handle_snapshot(snapshot),
            Report::Unsupported => Vec::new(),
        }
    }

    /// Applies an external request. `Shutdown` is handled by the worker.
    pub fn handle_command(&mut self, command: ControllerCommand) {
        debug!("Command: {:?}", command);

        match command {
            ControllerCommand::Calibrate => self.begin_calibration(),
            ControllerCommand::EnableTracking => self.enable_tracking(),
            ControllerCommand::Disable => self.disable(),
            ControllerCommand::ToggleTracking if self.mode == ControllerMode::Tracking => self.disable(),
            ControllerCommand::ToggleTracking => self.enable_tracking(),
            ControllerCommand::Shutdown => {}
        }
    }

    fn enable_tracking(&mut self) {
        if self.transform.is_computed() {
            self.smoothing.clear();
            self.set_mode(ControllerMode::Tracking);
        } else {
            warn!("Cannot enable tracking before calibrating");
        }
    }

    fn disable(&mut self) {
        self.release_pointer();
        self.set_mode(ControllerMode::Idle);
    }

    /// Releases the pointer and announces device loss.
    pub fn disconnect(&mut self) {
        self.release_pointer();
        self.events.emit(ControllerEvent::Disconnected);
    }

    fn handle_status(&mut self, status: StatusInfo) -> Vec<Vec<u8>> {
        if status.critical {
            warn!("Battery critical ({}%)", status.battery_percent);
        } else {
            debug!("Battery {}%", status.battery_percent);
        }

        self.events.emit(ControllerEvent::StatusReport {
            battery_percent: status.battery_percent,
            critical: status.critical,
        });

        // A status report drops the device back to buttons-only reporting
        vec![encode_pointer_report_mode()]
    }

    fn handle_snapshot(&mut self, snapshot: Snapshot) -> Vec<Vec<u8>> {
        let writes: Vec<Vec<u8>> = self.feedback.update(snapshot.tracked_mask()).into_iter().collect();

        match evaluate(&self.previous, &snapshot) {
            Decision::Key(direction) => self.events.emit(ControllerEvent::KeyPress(direction)),
            Decision::Volume(delta) => self.events.emit(ControllerEvent::VolumeDelta(delta)),
            Decision::LaserShow => {
                let (x, y) = self.laser.offset(snapshot.orientation);
                self.events.emit(ControllerEvent::LaserPointer { visible: true, x, y });
            }
            Decision::LaserHide => {
                self.events.emit(ControllerEvent::LaserPointer { visible: false, x: 0, y: 0 });
            }
            Decision::BeginCalibration => self.begin_calibration(),
            Decision::DotTracked { appeared } => match self.mode {
                ControllerMode::Tracking => self.track(snapshot.dot1()),
                ControllerMode::Calibrating if appeared => self.capture(snapshot.dot1()),
                ControllerMode::Calibrating | ControllerMode::Idle => {}
            },
            Decision::Released => {
                self.smoothing.clear();
                self.release_pointer();
            }
        }

        self.previous = snapshot;
        writes
    }

    fn set_mode(&mut self, mode: ControllerMode) {
        if self.mode != mode {
            info!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn begin_calibration(&mut self) {
        self.release_pointer();
        self.calibration.clear();
        self.set_mode(ControllerMode::Calibrating);
        self.events.emit(ControllerEvent::CalibrationProgress { points: 0 });
    }

    fn capture(&mut self, dot: IrDot) {
        if self.calibration.len() < CALIBRATION_POINTS {
            let point = Point::new(f64::from(dot.x), f64::from(dot.y));
            self.calibration.push(point);
            info!("Calibration point {}: ({}, {})", self.calibration.len(), dot.x, dot.y);
            self.events.emit(ControllerEvent::CalibrationProgress {
                points: self.calibration.len(),
            });
        }

        if self.calibration.len() == CALIBRATION_POINTS {
            self.commit_calibration();
        }
    }

    fn commit_calibration(&mut self) {
        let [tl, tr, bl, br] = [
            self.calibration[0],
            self.calibration[1],
            self.calibration[2],
            self.calibration[3],
        ];
        let quad = Quad::new(tl, tr, bl, br);

        // Points are kept on failure; the next dot retries with the same four
        if let Err(e) = self.transform.replace_source(quad) {
            error!("Calibration failed: {}", e);
            return;
        }

        if let Err(e) = self.store.save(&quad) {
            error!("Failed to save calibration: {}", e);
        }

        info!("Calibration complete");
        self.calibration.clear();
        self.smoothing.clear();
        self.set_mode(ControllerMode::Tracking);
    }

    fn track(&mut self, dot: IrDot) {
        let (x, y) = match self.transform.warp(f64::from(dot.x), f64::from(dot.y)) {
            Ok(point) => point,
            Err(e) => {
                debug!("Dropping dot ({}, {}): {}", dot.x, dot.y, e);
                return;
            }
        };

        let (x, y) = self.smoothing.apply(x, y);
        let x = clamp_to_screen(x, self.screen_width);
        let y = clamp_to_screen(y, self.screen_height);

        self.pointer.position = Some((x, y));
        self.events.emit(ControllerEvent::PointerMove { x, y });

        if !self.pointer.pressed {
            self.pointer.pressed = true;
            self.events.emit(ControllerEvent::PointerPress);
        }
    }

    fn release_pointer(&mut self) {
        self.pointer.position = None;
        if self.pointer.pressed {
            self.pointer.pressed = false;
            self.events.emit(ControllerEvent::PointerRelease);
        }
    }
}

/// Truncates to an integer pixel in `[0, extent - 2]`.
fn clamp_to_screen(value: f64, extent: u32) -> i32 {
    let upper = i64::from(extent) - 2;
    (value as i64).max(0).min(upper) as i32
}
