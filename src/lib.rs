//! # wiiboard Library
//!
//! Turn a Wii Remote and an IR pen into an interactive whiteboard.
//!
//! The Wii Remote's IR camera tracks the pen's light; after a four-corner
//! calibration, a perspective transform maps camera coordinates onto the
//! screen and the pen drives an absolute pointer. The D-pad, plus/minus and
//! A/B buttons add arrow keys, volume control and a laser-pointer overlay.

pub mod config;
pub mod error;
pub mod wiimote;
pub mod transport;
pub mod geometry;
pub mod controller;
pub mod desktop;
