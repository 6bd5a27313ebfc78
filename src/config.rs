// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the physics core.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QUBITOS_PHYSICS_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::cache::DEFAULT_CAPACITY;
use crate::error::{Error, Result};
use crate::evolution::{TrotterOrder, DEFAULT_TROTTER_SCALE};
use crate::lindblad::HygieneMode;
use crate::validation::{Tolerance, DEFAULT_TOLERANCE};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Numerical thresholds
    #[serde(default)]
    pub precision: PrecisionConfig,

    /// Time-evolution constants
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Open-system solver settings
    #[serde(default)]
    pub lindblad: LindbladSettings,

    /// Spectral cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// A missing file at an explicit path falls back to defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        } else {
            for path in &["physics.yaml", "physics.yml", "/etc/qubitos/physics.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    config = Self::from_file(path)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply environment variable overrides. Unparseable values are
    /// ignored with a warning.
    fn apply_env_overrides(&mut self) {
        override_parsed("QUBITOS_PHYSICS_TOLERANCE", &mut self.precision.tolerance);
        override_parsed("QUBITOS_PHYSICS_TROTTER_SCALE", &mut self.precision.trotter_scale);
        override_parsed("QUBITOS_PHYSICS_HBAR", &mut self.evolution.hbar);
        override_parsed("QUBITOS_PHYSICS_BOLTZMANN", &mut self.evolution.boltzmann);
        override_parsed("QUBITOS_PHYSICS_CACHE_CAPACITY", &mut self.cache.capacity);

        if let Ok(val) = env::var("QUBITOS_PHYSICS_TROTTER_ORDER") {
            match val.to_lowercase().as_str() {
                "first" | "1" => self.evolution.trotter_order = TrotterOrder::First,
                "second" | "2" => self.evolution.trotter_order = TrotterOrder::Second,
                other => tracing::warn!(value = other, "Ignoring QUBITOS_PHYSICS_TROTTER_ORDER"),
            }
        }
        if let Ok(val) = env::var("QUBITOS_PHYSICS_HYGIENE") {
            match val.to_lowercase().as_str() {
                "step_boundary" => self.lindblad.hygiene = HygieneMode::StepBoundary,
                "every_substep" => self.lindblad.hygiene = HygieneMode::EverySubstep,
                other => tracing::warn!(value = other, "Ignoring QUBITOS_PHYSICS_HYGIENE"),
            }
        }
        if let Ok(val) = env::var("QUBITOS_PHYSICS_STORE_TRAJECTORY") {
            self.lindblad.store_trajectory = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("QUBITOS_PHYSICS_CACHE") {
            self.cache.enabled = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("QUBITOS_PHYSICS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_PHYSICS_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.tolerance()?;
        require_positive("precision.trotter_scale", self.precision.trotter_scale)?;
        require_positive("evolution.hbar", self.evolution.hbar)?;
        require_positive("evolution.boltzmann", self.evolution.boltzmann)?;
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(Error::Config("cache.capacity must be at least 1".into()));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }
        if tracing::Level::from_str(&self.logging.level).is_err() {
            return Err(Error::Config(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        if self.precision.tolerance > 1e-6 {
            tracing::warn!(
                tolerance = self.precision.tolerance,
                "Tolerance is loose; physics checks may accept unphysical results"
            );
        }
        Ok(())
    }

    /// The configured tolerance as a checked value.
    pub fn tolerance(&self) -> Result<Tolerance> {
        Tolerance::new(self.precision.tolerance)
            .map_err(|e| Error::Config(format!("precision.tolerance: {e}")))
    }
}

fn override_parsed<T: FromStr>(var: &str, target: &mut T) {
    if let Ok(val) = env::var(var) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(var, value = %val, "Ignoring unparseable override"),
        }
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(Error::Config(format!("{field} must be positive and finite, got {value}")));
    }
    Ok(())
}

/// Numerical thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecisionConfig {
    /// Absolute tolerance for every physics check
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Trotter unitarity tolerance per unit |Δt|
    #[serde(default = "default_trotter_scale")]
    pub trotter_scale: f64,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            trotter_scale: default_trotter_scale(),
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_trotter_scale() -> f64 {
    DEFAULT_TROTTER_SCALE
}

/// Time-evolution constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Reduced Planck constant in the caller's units
    #[serde(default = "default_one")]
    pub hbar: f64,

    /// Boltzmann constant in the caller's units
    #[serde(default = "default_one")]
    pub boltzmann: f64,

    /// Product-formula order for Trotter evolution
    #[serde(default)]
    pub trotter_order: TrotterOrder,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            hbar: default_one(),
            boltzmann: default_one(),
            trotter_order: TrotterOrder::default(),
        }
    }
}

fn default_one() -> f64 {
    1.0
}

/// Open-system solver settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LindbladSettings {
    /// When positivity repair runs
    #[serde(default)]
    pub hygiene: HygieneMode,

    /// Keep ρ at every step
    #[serde(default)]
    pub store_trajectory: bool,
}

/// Spectral cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Share one spectral cache across a `PhysicsCore`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached decompositions
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.precision.tolerance, 1e-10);
        assert_eq!(config.evolution.hbar, 1.0);
        assert_eq!(config.evolution.trotter_order, TrotterOrder::First);
        assert_eq!(config.lindblad.hygiene, HygieneMode::StepBoundary);
        assert!(!config.lindblad.store_trajectory);
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = Config::default();
        bad.precision.tolerance = 0.0;
        assert!(matches!(bad.validate(), Err(Error::Config(_))));

        let mut bad = Config::default();
        bad.evolution.hbar = -1.0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.logging.format = "xml".into();
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.logging.level = "loud".into();
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.cache.capacity = 0;
        assert!(bad.validate().is_err());
        bad.cache.enabled = false;
        assert!(bad.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
precision:
  tolerance: 1.0e-9
evolution:
  hbar: 0.5
  trotter_order: second
lindblad:
  hygiene: every_substep
  store_trajectory: true
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.precision.tolerance, 1e-9);
        assert_eq!(config.precision.trotter_scale, DEFAULT_TROTTER_SCALE);
        assert_eq!(config.evolution.hbar, 0.5);
        assert_eq!(config.evolution.boltzmann, 1.0);
        assert_eq!(config.evolution.trotter_order, TrotterOrder::Second);
        assert_eq!(config.lindblad.hygiene, HygieneMode::EverySubstep);
        assert!(config.lindblad.store_trajectory);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_qubitos_physics_test.yaml");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.evolution.boltzmann, 1.0);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();
        assert!(matches!(Config::load(Some(f.path())), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("hygiene: step_boundary"));
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.cache.capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_env_override_hbar() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PHYSICS_HBAR", "0.25");
        config.apply_env_overrides();
        assert_eq!(config.evolution.hbar, 0.25);
        std::env::remove_var("QUBITOS_PHYSICS_HBAR");
    }

    #[test]
    fn test_env_override_unparseable_is_ignored() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PHYSICS_BOLTZMANN", "hot");
        config.apply_env_overrides();
        assert_eq!(config.evolution.boltzmann, 1.0);
        std::env::remove_var("QUBITOS_PHYSICS_BOLTZMANN");
    }

    #[test]
    fn test_env_override_hygiene() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PHYSICS_HYGIENE", "EVERY_SUBSTEP");
        config.apply_env_overrides();
        assert_eq!(config.lindblad.hygiene, HygieneMode::EverySubstep);
        std::env::remove_var("QUBITOS_PHYSICS_HYGIENE");
    }

    #[test]
    fn test_env_override_store_trajectory() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PHYSICS_STORE_TRAJECTORY", "1");
        config.apply_env_overrides();
        assert!(config.lindblad.store_trajectory);
        std::env::remove_var("QUBITOS_PHYSICS_STORE_TRAJECTORY");
    }

    #[test]
    fn test_env_override_log_level() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PHYSICS_LOG_LEVEL", "debug");
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "debug");
        std::env::remove_var("QUBITOS_PHYSICS_LOG_LEVEL");
    }
}
