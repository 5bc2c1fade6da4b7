//! # Geometry Module
//!
//! Camera-to-screen coordinate mapping.

pub mod perspective;

pub use perspective::{PerspectiveTransform, Point, Quad};
