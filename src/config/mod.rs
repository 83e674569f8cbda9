//! Configuration module
//!
//! Loads emitter and bench settings from a TOML file. Every section and field
//! is optional; missing values fall back to the defaults below.
//!
//! # Example
//! ```ignore
//! let config = Config::load("config.toml")?;
//! let emitter_config = config.emitter.to_emitter_config();
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::emitter::{EmitterConfig, DEFAULT_INITIAL_CAPACITY};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub emitter: EmitterFileConfig,
    #[serde(default)]
    pub bench: BenchFileConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the emitter or bench cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.emitter.emit_threshold == 0 {
            return Err(ConfigError::invalid("emitter.emit_threshold", "must be > 0"));
        }
        if self.emitter.sink_capacity == 0 {
            return Err(ConfigError::invalid("emitter.sink_capacity", "must be > 0"));
        }
        if self.bench.producers == 0 {
            return Err(ConfigError::invalid("bench.producers", "must be > 0"));
        }
        if !self.bench.jitter_ns.is_finite() || self.bench.jitter_ns < 0.0 {
            return Err(ConfigError::invalid(
                "bench.jitter_ns",
                format!("must be finite and >= 0, got {}", self.bench.jitter_ns),
            ));
        }
        if !self.bench.event_spacing_ns.is_finite() || self.bench.event_spacing_ns <= 0.0 {
            return Err(ConfigError::invalid(
                "bench.event_spacing_ns",
                format!("must be finite and > 0, got {}", self.bench.event_spacing_ns),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Emitter Configuration
// =============================================================================

/// `[emitter]` section
#[derive(Debug, Clone, Deserialize)]
pub struct EmitterFileConfig {
    /// Buffer occupancy that triggers emission
    #[serde(default = "default_emit_threshold")]
    pub emit_threshold: usize,

    /// Initial heap allocation
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Capacity of the bounded output channel
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
}

impl Default for EmitterFileConfig {
    fn default() -> Self {
        Self {
            emit_threshold: default_emit_threshold(),
            initial_capacity: default_initial_capacity(),
            sink_capacity: default_sink_capacity(),
        }
    }
}

impl EmitterFileConfig {
    pub fn to_emitter_config(&self) -> EmitterConfig {
        EmitterConfig {
            emit_threshold: self.emit_threshold,
            initial_capacity: self.initial_capacity,
        }
    }
}

fn default_emit_threshold() -> usize {
    100
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

fn default_sink_capacity() -> usize {
    1000
}

// =============================================================================
// Bench Configuration
// =============================================================================

/// `[bench]` section: synthetic out-of-order stream
#[derive(Debug, Clone, Deserialize)]
pub struct BenchFileConfig {
    /// Total events across all producers
    #[serde(default = "default_events")]
    pub events: u64,

    /// Concurrent producer threads
    #[serde(default = "default_producers")]
    pub producers: usize,

    /// Gaussian sigma applied to each nominal timestamp
    #[serde(default = "default_jitter_ns")]
    pub jitter_ns: f64,

    /// Nominal distance between consecutive timestamps
    #[serde(default = "default_event_spacing_ns")]
    pub event_spacing_ns: f64,

    /// RNG seed; random if unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BenchFileConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
            producers: default_producers(),
            jitter_ns: default_jitter_ns(),
            event_spacing_ns: default_event_spacing_ns(),
            seed: None,
        }
    }
}

fn default_events() -> u64 {
    100_000
}

fn default_producers() -> usize {
    4
}

fn default_jitter_ns() -> f64 {
    500.0
}

fn default_event_spacing_ns() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.emitter.emit_threshold, 100);
        assert_eq!(config.emitter.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert_eq!(config.emitter.sink_capacity, 1000);
        assert_eq!(config.bench.events, 100_000);
        assert_eq!(config.bench.producers, 4);
        assert!(config.bench.seed.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[emitter]
emit_threshold = 64
initial_capacity = 128
sink_capacity = 10

[bench]
events = 5000
producers = 2
jitter_ns = 250.0
event_spacing_ns = 10.0
seed = 42
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.emitter.emit_threshold, 64);
        assert_eq!(config.emitter.sink_capacity, 10);
        assert_eq!(config.bench.events, 5000);
        assert_eq!(config.bench.producers, 2);
        assert_eq!(config.bench.jitter_ns, 250.0);
        assert_eq!(config.bench.seed, Some(42));

        let emitter = config.emitter.to_emitter_config();
        assert_eq!(emitter.emit_threshold, 64);
        assert_eq!(emitter.initial_capacity, 128);
    }

    #[test]
    fn zero_threshold_rejected() {
        let toml = r#"
[emitter]
emit_threshold = 0
"#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("emitter.emit_threshold"));
    }

    #[test]
    fn negative_jitter_rejected() {
        let toml = r#"
[bench]
jitter_ns = -1.0
"#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::InvalidValue {
                field: "bench.jitter_ns",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml() {
        let err = Config::from_toml("[emitter\nemit_threshold = 3").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn missing_file() {
        let err = Config::load("/nonexistent/reorder.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
