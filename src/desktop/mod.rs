//! # Desktop Module
//!
//! Delivery of controller events to the desktop session.

pub mod uinput;
