//! Configuration shared by every dataset of a simulation run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ExtrapolationPolicy;

/// Run-level configuration passed to `init`, `update` and `prime_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Calendar origin of the run. Input frames fall on
    /// `origin + k * cadence` for integer `k`.
    pub origin: DateTime<Utc>,

    /// Behaviour of spatial interpolation outside the source coordinate range.
    pub extrapolation: ExtrapolationPolicy,

    /// Base directory relative source locations are resolved against.
    pub input_root: PathBuf,

    /// Allowed difference in seconds between the date a variant reports for a
    /// loaded frame and the cadence slot that was requested.
    pub cadence_tolerance_secs: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            origin: DateTime::<Utc>::default(),
            extrapolation: ExtrapolationPolicy::Clamp,
            input_root: PathBuf::from("."),
            cadence_tolerance_secs: 1.0e-3,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration anchored at `origin` with default options.
    pub fn with_origin(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STAGING_ORIGIN") {
            if let Ok(origin) = DateTime::parse_from_rfc3339(&val) {
                config.origin = origin.with_timezone(&Utc);
            }
        }

        if let Ok(val) = std::env::var("STAGING_EXTRAPOLATION") {
            config.extrapolation = ExtrapolationPolicy::from_str(&val);
        }

        if let Ok(val) = std::env::var("STAGING_INPUT_ROOT") {
            config.input_root = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("STAGING_CADENCE_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                config.cadence_tolerance_secs = tol;
            }
        }

        config
    }

    /// Parse configuration from a YAML document. Missing keys take defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.cadence_tolerance_secs.is_finite() || self.cadence_tolerance_secs < 0.0 {
            return Err("cadence_tolerance_secs must be finite and >= 0".to_string());
        }

        if self.input_root.as_os_str().is_empty() {
            return Err("input_root must not be empty".to_string());
        }

        Ok(())
    }

    /// Resolve a dataset source location against `input_root`.
    pub fn resolve_source(&self, location: impl AsRef<Path>) -> PathBuf {
        let location = location.as_ref();
        if location.is_absolute() {
            location.to_path_buf()
        } else {
            self.input_root.join(location)
        }
    }
}
