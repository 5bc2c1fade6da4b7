//! # Configuration Module
//!
//! Handles loading, validating and persisting configuration in TOML files.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. [`Config::load_lenient`] falls back per field: a value of
//! the wrong type or out of range is replaced by its default and the rest of
//! the file is kept. The `[calibration]` corners are rewritten atomically
//! each time a calibration completes, leaving every other key untouched.
//!
//! ```toml
//! [device]
//! ir_sensitivity = "max"
//! read_timeout_ms = 100
//!
//! [screen]
//! width = 1920
//! height = 1080
//! margin = 0.05
//!
//! [calibration]
//! top_left = [112, 98]
//! top_right = [901, 143]
//! bottom_left = [125, 702]
//! bottom_right = [884, 655]
//! smoothing = 4
//!
//! [pointer]
//! yaw = 8175
//! pitch = 8140
//! factor = 0.02
//! ```

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::controller::laser::LaserPointer;
use crate::controller::state_machine::{CalibrationStore, ControllerSettings};
use crate::error::{Result, WiiboardError};
use crate::geometry::perspective::{Point, Quad};
use crate::wiimote::protocol::IrSensitivity;

/// File name looked up in the user's config directory.
pub const CONFIG_FILE_NAME: &str = "wiiboard.toml";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub screen: ScreenConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub pointer: PointerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeviceConfig {
    #[serde(default)]
    pub ir_sensitivity: IrSensitivity,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Target screen configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: u32,

    #[serde(default = "default_screen_height")]
    pub height: u32,

    #[serde(default = "default_margin")]
    pub margin: f64,
}

/// Saved calibration, camera-space corners as `[x, y]`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalibrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_left: Option<[i32; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_right: Option<[i32; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_left: Option<[i32; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_right: Option<[i32; 2]>,

    #[serde(default = "default_smoothing")]
    pub smoothing: usize,
}

/// Laser pointer configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointerConfig {
    #[serde(default = "default_yaw")]
    pub yaw: i32,

    #[serde(default = "default_pitch")]
    pub pitch: i32,

    #[serde(default = "default_factor")]
    pub factor: f64,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    /// Directory for daily log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

// Default value functions
fn default_read_timeout_ms() -> u64 { 100 }

fn default_screen_width() -> u32 { 1920 }
fn default_screen_height() -> u32 { 1080 }
fn default_margin() -> f64 { 0.05 }

fn default_smoothing() -> usize { 4 }

fn default_yaw() -> i32 { 8175 }
fn default_pitch() -> i32 { 8140 }
fn default_factor() -> f64 { 0.02 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ir_sensitivity: IrSensitivity::default(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
            margin: default_margin(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            top_left: None,
            top_right: None,
            bottom_left: None,
            bottom_right: None,
            smoothing: default_smoothing(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            yaw: default_yaw(),
            pitch: default_pitch(),
            factor: default_factor(),
        }
    }
}

impl CalibrationConfig {
    /// The saved quad, if all four corners are present.
    #[must_use]
    pub fn quad(&self) -> Option<Quad> {
        let point = |[x, y]: [i32; 2]| Point::new(f64::from(x), f64::from(y));

        Some(Quad::new(
            point(self.top_left?),
            point(self.top_right?),
            point(self.bottom_left?),
            point(self.bottom_right?),
        ))
    }

    /// Corner keys paired with their values, in file order.
    #[must_use]
    pub fn corners(&self) -> [(&'static str, Option<[i32; 2]>); 4] {
        [
            ("top_left", self.top_left),
            ("top_right", self.top_right),
            ("bottom_left", self.bottom_left),
            ("bottom_right", self.bottom_right),
        ]
    }

    /// Replaces the corners with `quad`, rounded to whole camera pixels.
    pub fn set_quad(&mut self, quad: &Quad) {
        let corner = |p: Point| Some([p.x.round() as i32, p.y.round() as i32]);
        let [tl, tr, bl, br] = quad.0;

        self.top_left = corner(tl);
        self.top_right = corner(tr);
        self.bottom_left = corner(bl);
        self.bottom_right = corner(br);
    }
}

fn invalid(message: impl std::fmt::Display) -> WiiboardError {
    WiiboardError::Config(toml::de::Error::custom(message))
}

/// A value outside its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    ReadTimeout,
    ScreenWidth,
    ScreenHeight,
    Margin,
    Smoothing,
    Factor,
}

impl Violation {
    fn message(self) -> &'static str {
        match self {
            Violation::ReadTimeout => "read_timeout_ms must be between 1 and 10000",
            Violation::ScreenWidth => "screen width must be between 2 and 32768",
            Violation::ScreenHeight => "screen height must be between 2 and 32768",
            Violation::Margin => "screen margin must be at least 0.0 and below 0.5",
            Violation::Smoothing => "smoothing must be between 0 and 64",
            Violation::Factor => "pointer factor must be a finite number",
        }
    }

    /// Puts the offending field back to its default.
    fn reset(self, config: &mut Config) {
        match self {
            Violation::ReadTimeout => config.device.read_timeout_ms = default_read_timeout_ms(),
            Violation::ScreenWidth => config.screen.width = default_screen_width(),
            Violation::ScreenHeight => config.screen.height = default_screen_height(),
            Violation::Margin => config.screen.margin = default_margin(),
            Violation::Smoothing => config.calibration.smoothing = default_smoothing(),
            Violation::Factor => config.pointer.factor = default_factor(),
        }
    }
}

/// Outcome of [`Config::load_lenient`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    /// Configuration with every unusable value replaced by its default
    pub config: Config,
    /// Whether the file existed
    pub found: bool,
    /// One entry per value (or file) that fell back to defaults
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Logs how the configuration was obtained and returns it.
    pub fn into_config(self, path: &Path) -> Config {
        if !self.found {
            info!("No configuration at {}, using defaults", path.display());
        } else if self.warnings.is_empty() {
            info!("Loaded configuration from {}", path.display());
        } else {
            for warning in &self.warnings {
                warn!("{}: {}", path.display(), warning);
            }
            info!(
                "Loaded configuration from {} ({} value(s) replaced by defaults)",
                path.display(),
                self.warnings.len()
            );
        }
        self.config
    }
}

/// Deserializes one `[section]`, dropping each key that does not fit.
fn section<T>(root: &toml::Table, name: &str, warnings: &mut Vec<String>) -> T
where
    T: DeserializeOwned + Default,
{
    let table = match root.get(name) {
        None => return T::default(),
        Some(toml::Value::Table(table)) => table,
        Some(_) => {
            warnings.push(format!("[{}] is not a table, using defaults", name));
            return T::default();
        }
    };

    let mut usable = toml::Table::new();
    for (key, value) in table {
        let mut single = toml::Table::new();
        single.insert(key.clone(), value.clone());

        match T::deserialize(toml::Value::Table(single)) {
            Ok(_) => {
                usable.insert(key.clone(), value.clone());
            }
            Err(e) => warnings.push(format!("[{}] {}: {}, using default", name, key, e.message())),
        }
    }

    T::deserialize(toml::Value::Table(usable)).unwrap_or_default()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wiiboard::config::Config;
    ///
    /// let config = Config::load("wiiboard.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults per field.
    ///
    /// Never fails. A missing file, an unreadable file, or a file that is
    /// not TOML at all yields [`Config::default`]. Otherwise each value of
    /// the wrong type or out of range is replaced by its default and
    /// recorded in [`LoadedConfig::warnings`].
    pub fn load_lenient<P: AsRef<Path>>(path: P) -> LoadedConfig {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let (config, warnings) = Self::parse_lenient(&contents);
                LoadedConfig {
                    config,
                    found: true,
                    warnings,
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => LoadedConfig {
                config: Self::default(),
                found: false,
                warnings: Vec::new(),
            },
            Err(e) => LoadedConfig {
                config: Self::default(),
                found: true,
                warnings: vec![format!("cannot read file, using defaults: {}", e)],
            },
        }
    }

    /// [`Config::load_lenient`], logging every fallback.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_lenient(path).into_config(path)
    }

    /// Parses `contents`, replacing unusable values with defaults.
    ///
    /// Returns the configuration and one warning per replaced value.
    #[must_use]
    pub fn parse_lenient(contents: &str) -> (Self, Vec<String>) {
        let root: toml::Table = match toml::from_str(contents) {
            Ok(root) => root,
            Err(e) => return (Self::default(), vec![format!("cannot parse file, using defaults: {}", e)]),
        };

        let mut warnings = Vec::new();
        let mut config = Self {
            device: section(&root, "device", &mut warnings),
            screen: section(&root, "screen", &mut warnings),
            calibration: section(&root, "calibration", &mut warnings),
            pointer: section(&root, "pointer", &mut warnings),
            logging: section(&root, "logging", &mut warnings),
        };
        warnings.extend(config.sanitize());

        (config, warnings)
    }

    /// Default configuration path: `$XDG_CONFIG_HOME/wiiboard.toml`, else
    /// `$HOME/.config/wiiboard.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        path_from_env(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
    }

    fn violations(&self) -> Vec<Violation> {
        let mut found = Vec::new();

        if !(1..=10000).contains(&self.device.read_timeout_ms) {
            found.push(Violation::ReadTimeout);
        }
        if !(2..=32768).contains(&self.screen.width) {
            found.push(Violation::ScreenWidth);
        }
        if !(2..=32768).contains(&self.screen.height) {
            found.push(Violation::ScreenHeight);
        }
        if !(0.0..0.5).contains(&self.screen.margin) {
            found.push(Violation::Margin);
        }
        if self.calibration.smoothing > 64 {
            found.push(Violation::Smoothing);
        }
        if !self.pointer.factor.is_finite() {
            found.push(Violation::Factor);
        }

        found
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        match self.violations().first() {
            Some(violation) => Err(invalid(violation.message())),
            None => Ok(()),
        }
    }

    /// Resets each out-of-range value to its default.
    ///
    /// Returns one warning per reset value; valid values are left alone.
    pub fn sanitize(&mut self) -> Vec<String> {
        self.violations()
            .into_iter()
            .map(|violation| {
                violation.reset(self);
                format!("{}, using default", violation.message())
            })
            .collect()
    }

    /// Settings for [`Controller::new`](crate::controller::Controller::new)
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            screen_width: self.screen.width,
            screen_height: self.screen.height,
            margin: self.screen.margin,
            smoothing: self.calibration.smoothing,
            laser: LaserPointer::new(self.pointer.yaw, self.pointer.pitch, self.pointer.factor),
            calibration: self.calibration.quad(),
        }
    }

    /// Read timeout for the worker loop
    #[must_use]
    pub fn read_timeout_ms(&self) -> i32 {
        i32::try_from(self.device.read_timeout_ms).unwrap_or(i32::MAX)
    }
}

fn path_from_env(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(dir) = xdg_config_home.filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir).join(CONFIG_FILE_NAME));
    }

    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".config").join(CONFIG_FILE_NAME))
}

/// A configuration bound to the file it is persisted to.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
}

impl ConfigFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Document to write after a calibration.
    ///
    /// An existing file keeps every key it has; only the four corners in
    /// `[calibration]` are replaced. A missing file gets the whole
    /// configuration.
    fn merged_document(&self) -> Result<String> {
        let mut root: toml::Table = match fs::read_to_string(&self.path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(toml::to_string_pretty(&self.config)?),
            Err(e) => return Err(e.into()),
        };

        let calibration = root
            .entry("calibration")
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if !calibration.is_table() {
            *calibration = toml::Value::Table(toml::Table::new());
        }

        if let toml::Value::Table(table) = calibration {
            for (key, corner) in self.config.calibration.corners() {
                match corner {
                    Some([x, y]) => {
                        let value = vec![toml::Value::Integer(x.into()), toml::Value::Integer(y.into())];
                        table.insert(key.to_string(), toml::Value::Array(value));
                    }
                    None => {
                        table.remove(key);
                    }
                }
            }
        }

        Ok(toml::to_string_pretty(&root)?)
    }

    /// Atomically replaces the file with `contents`.
    ///
    /// The file is written to a temporary file in the same directory and
    /// renamed over the target, so readers never see a partial file.
    fn write(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;

        Ok(())
    }
}

impl CalibrationStore for ConfigFile {
    /// Stores the corners without touching the rest of the file.
    ///
    /// A file that exists but is not valid TOML is left alone and the save
    /// fails with `Config`, so a hand-edited file is never clobbered.
    fn save(&mut self, quad: &Quad) -> Result<()> {
        self.config.calibration.set_quad(quad);
        let contents = self.merged_document()?;
        self.write(&contents)?;
        info!("Calibration saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, contents).unwrap();
        path
    }

    fn sample_quad() -> Quad {
        Quad::new(
            Point::new(112.0, 98.0),
            Point::new(901.0, 143.0),
            Point::new(125.0, 702.0),
            Point::new(884.0, 655.0),
        )
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.calibration.quad().is_none());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_read_timeout_ms(), 100);
        assert_eq!(default_screen_width(), 1920);
        assert_eq!(default_screen_height(), 1080);
        assert_eq!(default_margin(), 0.05);
        assert_eq!(default_smoothing(), 4);
        assert_eq!(default_yaw(), 8175);
        assert_eq!(default_pitch(), 8140);
        assert_eq!(default_factor(), 0.02);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[device]
ir_sensitivity = "level3"

[screen]
width = 1280
height = 800

[calibration]
top_left = [112, 98]
top_right = [901, 143]
bottom_left = [125, 702]
bottom_right = [884, 655]
smoothing = 2

[pointer]
factor = 0.05
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.device.ir_sensitivity, IrSensitivity::Level3);
        assert_eq!(config.device.read_timeout_ms, 100);
        assert_eq!(config.screen.width, 1280);
        assert_eq!(config.screen.margin, 0.05);
        assert_eq!(config.calibration.quad(), Some(sample_quad()));
        assert_eq!(config.pointer.yaw, 8175);
        assert_eq!(config.pointer.factor, 0.05);
    }

    #[test]
    fn test_partial_calibration_is_absent() {
        let config: Config = toml::from_str(
            r#"
[calibration]
top_left = [1, 2]
top_right = [3, 4]
bottom_left = [5, 6]
"#,
        )
        .unwrap();

        assert!(config.calibration.quad().is_none());
        assert!(config.controller_settings().calibration.is_none());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[screen]\nmargin = 0.6\n");
        assert!(matches!(Config::load(&path), Err(WiiboardError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[screen\nwidth = ");
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_load_or_default_unknown_sensitivity() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[device]\nir_sensitivity = \"level9\"\n");
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_out_of_range_value_keeps_rest_of_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[screen]
width = 2560

[calibration]
top_left = [112, 98]
top_right = [901, 143]
bottom_left = [125, 702]
bottom_right = [884, 655]
smoothing = 100

[pointer]
yaw = 9000
"#,
        );

        let loaded = Config::load_lenient(&path);
        assert!(loaded.found);
        assert_eq!(loaded.warnings.len(), 1);

        let config = loaded.config;
        assert_eq!(config.calibration.smoothing, 4);
        assert_eq!(config.calibration.quad(), Some(sample_quad()));
        assert_eq!(config.screen.width, 2560);
        assert_eq!(config.pointer.yaw, 9000);
        assert!(config.controller_settings().calibration.is_some());
    }

    #[test]
    fn test_wrong_type_keeps_rest_of_section() {
        let (config, warnings) = Config::parse_lenient(
            r#"
[screen]
width = "wide"
height = 900

[device]
ir_sensitivity = "level9"
read_timeout_ms = 250
"#,
        );

        assert_eq!(warnings.len(), 2);
        assert_eq!(config.screen.width, 1920);
        assert_eq!(config.screen.height, 900);
        assert_eq!(config.device.ir_sensitivity, IrSensitivity::Max);
        assert_eq!(config.device.read_timeout_ms, 250);
    }

    #[test]
    fn test_bad_corner_drops_only_that_corner() {
        let (config, warnings) = Config::parse_lenient(
            r#"
[calibration]
top_left = "here"
top_right = [901, 143]
smoothing = 2
"#,
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(config.calibration.top_left, None);
        assert_eq!(config.calibration.top_right, Some([901, 143]));
        assert_eq!(config.calibration.smoothing, 2);
    }

    #[test]
    fn test_section_not_a_table() {
        let (config, warnings) = Config::parse_lenient("screen = 5\n[pointer]\nyaw = 9000\n");

        assert_eq!(warnings.len(), 1);
        assert_eq!(config.screen, ScreenConfig::default());
        assert_eq!(config.pointer.yaw, 9000);
    }

    #[test]
    fn test_valid_file_has_no_warnings() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[screen]\nwidth = 1280\n");

        let loaded = Config::load_lenient(&path);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config, Config::load(&path).unwrap());
    }

    #[test]
    fn test_load_lenient_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_lenient(dir.path().join("missing.toml"));

        assert!(!loaded.found);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config, Config::default());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_read_timeout_zero() {
        let mut config = Config::default();
        config.device.read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_timeout_too_high() {
        let mut config = Config::default();
        config.device.read_timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_screen_too_small() {
        let mut config = Config::default();
        config.screen.width = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_margin_negative() {
        let mut config = Config::default();
        config.screen.margin = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_margin_zero_is_valid() {
        let mut config = Config::default();
        config.screen.margin = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_smoothing_too_high() {
        let mut config = Config::default();
        config.calibration.smoothing = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_factor_not_finite() {
        let mut config = Config::default();
        config.pointer.factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitize_resets_only_invalid_values() {
        let mut config = Config::default();
        config.screen.width = 2560;
        config.screen.margin = 0.6;
        config.device.read_timeout_ms = 0;

        let warnings = config.sanitize();

        assert_eq!(warnings.len(), 2);
        assert_eq!(config.screen.width, 2560);
        assert_eq!(config.screen.margin, 0.05);
        assert_eq!(config.device.read_timeout_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sanitize_valid_config_is_unchanged() {
        let mut config = Config::default();
        assert!(config.sanitize().is_empty());
        assert_eq!(config, Config::default());
    }

    // ==================== Path Tests ====================

    #[test]
    fn test_path_prefers_xdg() {
        let path = path_from_env(Some("/xdg".into()), Some("/home/user".into()));
        assert_eq!(path, Some(PathBuf::from("/xdg/wiiboard.toml")));
    }

    #[test]
    fn test_path_falls_back_to_home() {
        let path = path_from_env(Some("".into()), Some("/home/user".into()));
        assert_eq!(path, Some(PathBuf::from("/home/user/.config/wiiboard.toml")));
    }

    #[test]
    fn test_path_without_env() {
        assert_eq!(path_from_env(None, None), None);
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_save_calibration_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.screen.width = 1280;
        config.pointer.yaw = 9000;

        let mut file = ConfigFile::new(&path, config);
        file.save(&sample_quad()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.calibration.quad(), Some(sample_quad()));
        assert_eq!(loaded.screen.width, 1280);
        assert_eq!(loaded.pointer.yaw, 9000);
        assert_eq!(&loaded, file.config());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[calibration]\ntop_left = [0, 0]\n");

        let config = Config::load(&path).unwrap();
        let mut file = ConfigFile::new(&path, config);
        file.save(&sample_quad()).unwrap();

        // Only the target remains; the temporary file was renamed over it
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(Config::load(&path).unwrap().calibration.top_left, Some([112, 98]));
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut file = ConfigFile::new(&path, Config::default());
        file.save(&sample_quad()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_save_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[screen]
width = 2560

[calibration]
top_left = [0, 0]
top_right = [10, 0]
bottom_left = [0, 10]
bottom_right = [10, 10]
smoothing = 100

[pointer]
yaw = 9000
"#,
        );

        let config = Config::load_or_default(&path);
        let mut file = ConfigFile::new(&path, config);
        file.save(&sample_quad()).unwrap();

        let on_disk: toml::Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["screen"]["width"].as_integer(), Some(2560));
        assert_eq!(on_disk["pointer"]["yaw"].as_integer(), Some(9000));
        // Out-of-range values stay in the file for the user to fix
        assert_eq!(on_disk["calibration"]["smoothing"].as_integer(), Some(100));
        // Keys the file never had are not added
        assert!(on_disk.get("device").is_none());

        let (reloaded, _) = Config::parse_lenient(&fs::read_to_string(&path).unwrap());
        assert_eq!(reloaded.calibration.quad(), Some(sample_quad()));
        assert_eq!(reloaded.screen.width, 2560);
    }

    #[test]
    fn test_save_replaces_non_table_calibration() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "calibration = 5\n");

        let mut file = ConfigFile::new(&path, Config::default());
        file.save(&sample_quad()).unwrap();

        assert_eq!(Config::load(&path).unwrap().calibration.quad(), Some(sample_quad()));
    }

    #[test]
    fn test_save_refuses_unparseable_file() {
        let dir = TempDir::new().unwrap();
        let contents = "[screen\nwidth = 2560\n";
        let path = write_config(&dir, contents);

        let config = Config::load_or_default(&path);
        let mut file = ConfigFile::new(&path, config);

        assert!(matches!(file.save(&sample_quad()), Err(WiiboardError::Config(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_set_quad_rounds() {
        let mut calibration = CalibrationConfig::default();
        let p = Point::new(10.6, 20.4);
        calibration.set_quad(&Quad::new(p, p, p, p));
        assert_eq!(calibration.top_left, Some([11, 20]));
    }

    #[test]
    fn test_controller_settings() {
        let mut config = Config::default();
        config.calibration.set_quad(&sample_quad());

        let settings = config.controller_settings();
        assert_eq!(settings.screen_width, 1920);
        assert_eq!(settings.margin, 0.05);
        assert_eq!(settings.smoothing, 4);
        assert_eq!(settings.laser, LaserPointer::new(8175, 8140, 0.02));
        assert_eq!(settings.calibration, Some(sample_quad()));
    }
}
