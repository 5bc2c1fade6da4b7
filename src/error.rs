//! # Error Types
//!
//! Custom error types for Wiiboard using `thiserror`.

use thiserror::Error;

/// Main error type for Wiiboard
#[derive(Debug, Error)]
pub enum WiiboardError {
    /// HID backend errors
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// No supported Wii Remote is connected
    #[error("Unable to find a Wii Remote HID device")]
    DeviceNotFound,

    /// Device read/write failures
    #[error("Transport error: {0}")]
    Transport(String),

    /// Quad with three collinear (or coincident) corners
    #[error("Degenerate quad: corners do not span a plane")]
    DegenerateQuad,

    /// Point maps to infinity under the current transform
    #[error("Singular warp: homogeneous w is zero")]
    SingularWarp,

    /// Configuration parse errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration serialization errors
    #[error("Configuration serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Atomic rename of the configuration file failed
    #[error("Configuration persist error: {0}")]
    ConfigPersist(#[from] tempfile::PersistError),

    /// Desktop input injection errors
    #[error("Input injector error: {0}")]
    Injector(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Wiiboard
pub type Result<T> = std::result::Result<T, WiiboardError>;
