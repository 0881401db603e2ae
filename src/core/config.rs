//! # Configuration Module
//!
//! Configuration structures for the access-log middleware, the counting
//! transport, the demo server and process logging.
//!
//! ## Key Features
//! - YAML configuration parsing with serde
//! - Environment variable override support
//! - Validation with detailed error messages

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{TrafficLogError, TrafficLogResult};
use crate::observability::config::{LogConfig, LogFormat};

/// Default capacity of the queue between request handlers and the log writer
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Demo server settings
    pub server: ServerConfig,

    /// Access-log middleware settings
    pub access_log: AccessLogConfig,

    /// Counting transport settings
    pub transport: TransportConfig,

    /// Process log settings
    pub logging: LogConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> TrafficLogResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TrafficLogError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: AppConfig = serde_yaml::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    ///
    /// Environment variables follow the pattern: TRAFFIC_LOG_<SECTION>_<FIELD>
    /// For example: TRAFFIC_LOG_ACCESS_LOG_DIR=/var/log/traffic
    pub fn apply_env_overrides(&mut self) -> TrafficLogResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TrafficLogResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TRAFFIC_LOG_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }

        // Access log overrides
        if let Some(dir) = lookup("TRAFFIC_LOG_ACCESS_LOG_DIR") {
            self.access_log.directory = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(stdout) = lookup("TRAFFIC_LOG_ACCESS_LOG_STDOUT") {
            self.access_log.stdout = stdout.parse().map_err(|e| {
                TrafficLogError::config(format!("Invalid TRAFFIC_LOG_ACCESS_LOG_STDOUT: {}", e))
            })?;
        }

        // Transport overrides
        if let Some(verbose) = lookup("TRAFFIC_LOG_TRANSPORT_VERBOSE") {
            self.transport.verbose = verbose.parse().map_err(|e| {
                TrafficLogError::config(format!("Invalid TRAFFIC_LOG_TRANSPORT_VERBOSE: {}", e))
            })?;
        }

        if let Some(timeout) = lookup("TRAFFIC_LOG_TRANSPORT_TIMEOUT") {
            self.transport.timeout = humantime::parse_duration(&timeout).map_err(|e| {
                TrafficLogError::config(format!("Invalid TRAFFIC_LOG_TRANSPORT_TIMEOUT: {}", e))
            })?;
        }

        // Logging overrides
        if let Some(level) = lookup("TRAFFIC_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("TRAFFIC_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                other => {
                    return Err(TrafficLogError::config(format!(
                        "Invalid TRAFFIC_LOG_FORMAT: {}",
                        other
                    )))
                }
            };
        }

        Ok(())
    }

    /// Validate the configuration, collecting every problem found
    pub fn validate(&self) -> TrafficLogResult<()> {
        let mut errors = Vec::new();

        if self.server.bind_address.is_empty() {
            errors.push("bind_address cannot be empty".to_string());
        }

        if self.access_log.queue_capacity == 0 {
            errors.push("access_log.queue_capacity must be greater than 0".to_string());
        }

        if let Some(dir) = self.access_log.log_directory() {
            if dir.is_file() {
                errors.push(format!(
                    "access_log.directory {} is a regular file",
                    dir.display()
                ));
            }
        }

        if self.transport.timeout.is_zero() {
            errors.push("transport.timeout must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TrafficLogError::config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

/// Demo server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the demo server listens on
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Access-log middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Directory receiving hourly log files; `None` (or empty) disables file output
    pub directory: Option<PathBuf>,

    /// Mirror every line to standard output
    pub stdout: bool,

    /// Capacity of the record queue in front of the writer
    pub queue_capacity: usize,
}

impl AccessLogConfig {
    /// Build a config the way the middleware constructor takes its arguments:
    /// an output directory (empty disables file output) and a stdout flag.
    pub fn new<P: AsRef<Path>>(directory: P, stdout: bool) -> Self {
        let directory = directory.as_ref();
        Self {
            directory: if directory.as_os_str().is_empty() {
                None
            } else {
                Some(directory.to_path_buf())
            },
            stdout,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// The output directory, if file output is enabled
    pub fn log_directory(&self) -> Option<&Path> {
        self.directory
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            stdout: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Counting transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Log a start and an end line for every round trip
    pub verbose: bool,

    /// Total timeout of the client built from this config
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            timeout: Duration::from_secs(30),
        }
    }
}
