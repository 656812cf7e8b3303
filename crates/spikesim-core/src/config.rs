//! Configuration loading and typed config structures for spikesim.
//!
//! The canonical configuration lives in `spikesim-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads the file. A
//! missing file is not an error at this layer; the engine falls back to
//! [`SimConfig::default`].

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `spikesim-config.yaml`. All fields have
/// defaults matching the original simulator's behavior.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// Spike generator settings (neuron count, rate, seed).
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Storage settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `DATABASE_URL` environment variable overrides
    /// `database.url`, so deployments can point at a different file
    /// without editing the YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.database.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.database.apply_env_overrides();
        Ok(config)
    }
}

/// Spike generator configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratorConfig {
    /// Number of simulated neurons; source ids are drawn from
    /// `[1, neuron_count]`.
    #[serde(default = "default_neuron_count")]
    pub neuron_count: u32,

    /// Target spike emission rate per second; one tick emits one spike.
    #[serde(default = "default_rate_per_second")]
    pub rate_per_second: f64,

    /// Random seed for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Milliseconds `stop()` waits for the in-flight tick to finish
    /// before returning regardless.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            neuron_count: default_neuron_count(),
            rate_per_second: default_rate_per_second(),
            seed: default_seed(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl DatabaseConfig {
    /// Override the database URL with the `DATABASE_URL` environment
    /// variable when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.url = val;
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// The host address to bind to.
    #[serde(default = "default_http_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_neuron_count() -> u32 {
    8
}

const fn default_rate_per_second() -> f64 {
    80.0
}

const fn default_seed() -> u64 {
    42
}

const fn default_stop_grace_ms() -> u64 {
    2_000
}

fn default_database_url() -> String {
    "sqlite://spikesim.db".to_owned()
}

fn default_http_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.generator.neuron_count, 8);
        assert!((config.generator.rate_per_second - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.generator.stop_grace_ms, 2_000);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.url, "sqlite://spikesim.db");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
generator:
  neuron_count: 16
  rate_per_second: 40.0
  seed: 7
  stop_grace_ms: 500

database:
  url: "sqlite://test.db"

http:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
"#;

        let config = SimConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.generator.neuron_count, 16);
        assert!((config.generator.rate_per_second - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.generator.seed, 7);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "generator:\n  neuron_count: 4\n";
        let config = SimConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Neuron count is overridden
        assert_eq!(config.generator.neuron_count, 4);
        // Everything else uses defaults
        assert!((config.generator.rate_per_second - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn parse_empty_yaml() {
        let yaml = "";
        let config = SimConfig::parse(yaml);
        assert!(config.is_ok());
    }
}
