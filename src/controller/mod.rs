//! # Controller Module
//!
//! Turns decoded Wii Remote reports into pointer, key and calibration events.
//!
//! This module handles:
//! - The Idle / Calibrating / Tracking state machine
//! - The ordered per-frame rule table (edge-triggered buttons, laser, dots)
//! - Pointer smoothing and laser offsets
//! - LED feedback for tracked IR dots
//! - The worker thread running the read loop

pub mod events;
pub mod feedback;
pub mod laser;
pub mod rules;
pub mod smoothing;
pub mod state_machine;
pub mod worker;

pub use events::{ControllerCommand, ControllerEvent, Direction, EventSink};
pub use state_machine::{CalibrationStore, Controller, ControllerMode, ControllerSettings};
