//! Simulation configuration.
//!
//! A [`SimConfig`] is built once and handed to the
//! [`Simulator`](crate::world::Simulator) at construction; nothing reads
//! global state. Configs can be written as YAML and loaded by name:
//!
//! ```text
//! config/
//! ├── default.yaml
//! ├── frictionless.yaml
//! └── ...
//! ```
//!
//! Every field is optional in YAML; missing fields take the defaults of
//! a 254 x 127 cm table with 6.4 cm, 0.5 kg balls.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(serde_yaml::Error),
    NotFound(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "YAML parse error: {}", e),
            ConfigError::NotFound(name) => write!(f, "Config not found: {}", name),
            ConfigError::Invalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err)
    }
}

/// Defaults for newly created balls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Radius in meters
    pub radius: f64,
    /// Mass in kilograms
    pub mass: f64,
}

impl BallConfig {
    /// Radius and mass must both be finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [("ball.radius", self.radius), ("ball.mass", self.mass)];
        check_positive(&positive)
    }
}

fn check_positive(values: &[(&str, f64)]) -> Result<(), ConfigError> {
    for &(name, value) in values {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 0.032, // 6.4cm diameter
            mass: 0.5,
        }
    }
}

/// Playing surface. The origin is the top-left corner; balls are kept
/// inside `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Width in meters (X extent)
    pub width: f64,
    /// Height in meters (Y extent)
    pub height: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 2.54,
            height: 1.27,
        }
    }
}

/// Immutable parameters of one simulation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub ball: BallConfig,
    pub table: TableConfig,
    /// Fixed timestep in seconds
    pub dt: f64,
    /// Kinetic friction coefficient between ball and cloth
    pub friction: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Pixels per centimeter on the drawing surface
    pub render_scale: f64,
    /// Table cloth color
    pub background: Rgb,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ball: BallConfig::default(),
            table: TableConfig::default(),
            dt: 1.0 / 120.0,
            friction: 0.7,
            gravity: 9.80665,
            render_scale: 4.0,
            background: Rgb::FELT,
        }
    }
}

impl SimConfig {
    /// Parse a config from YAML and validate it.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Same config with a different friction coefficient.
    pub fn with_friction(self, friction: f64) -> Self {
        Self { friction, ..self }
    }

    /// Check the physical preconditions the integrator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ball.validate()?;
        check_positive(&[
            ("table.width", self.table.width),
            ("table.height", self.table.height),
            ("dt", self.dt),
            ("render_scale", self.render_scale),
        ])?;

        let non_negative = [("friction", self.friction), ("gravity", self.gravity)];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        let diameter = 2.0 * self.ball.radius;
        if diameter > self.table.width || diameter > self.table.height {
            return Err(ConfigError::Invalid(format!(
                "ball diameter {} does not fit a {} x {} table",
                diameter, self.table.width, self.table.height
            )));
        }
        Ok(())
    }
}

/// Config loader with configurable base directory.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new loader over a directory of `*.yaml` configs.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a config by name (without .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = ConfigLoader::new("config");
    /// let config = loader.load("default")?;
    /// ```
    pub fn load(&self, name: &str) -> Result<SimConfig, ConfigError> {
        let path = self.base_path.join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        SimConfig::from_file(&path)
    }

    /// List all available config names, sorted.
    pub fn list(&self) -> Result<Vec<String>, ConfigError> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
