//! Configuration management for Auriga
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{AurigaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default polling interval in minutes, matching the upstream rate limits.
pub const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 60;

fn default_poll_interval_minutes() -> u64 {
    DEFAULT_POLL_INTERVAL_MINUTES
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Flitsmeister API endpoint configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Configured Flitsmeister accounts (one coordinator each)
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Polling interval in minutes
    #[serde(default = "default_poll_interval_minutes")]
    pub poll_interval_minutes: u64,
}

/// Flitsmeister API endpoint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Flitsmeister API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Credentials and identity for one Flitsmeister account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Stable identifier used for metric unique ids and registry keys
    pub id: String,

    /// Display name for the account's device grouping
    pub name: String,

    /// Opaque session token, passed through to the API unparsed
    pub session_token: String,

    /// Opaque access token, passed through to the API unparsed
    pub access_token: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level override
    #[serde(default)]
    pub console_level: Option<String>,

    /// Optional file-specific level override
    #[serde(default)]
    pub file_level: Option<String>,

    /// Path to log file (or directory for rotated logs)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://account.flitsmeister.app/api".to_string(),
            timeout_seconds: 10,
            user_agent: concat!("auriga/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/auriga.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            accounts: Vec::new(),
            logging: LoggingConfig::default(),
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "auriga_config.yaml",
            "/data/auriga_config.yaml",
            "/etc/auriga/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.is_empty() {
            return Err(AurigaError::validation(
                "upstream.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(AurigaError::validation(
                "upstream.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_minutes == 0 {
            return Err(AurigaError::validation(
                "poll_interval_minutes",
                "Must be greater than 0",
            ));
        }

        let mut seen_ids = HashSet::new();
        for account in &self.accounts {
            if account.id.is_empty() {
                return Err(AurigaError::validation(
                    "accounts.id",
                    "Account id cannot be empty",
                ));
            }
            if !seen_ids.insert(account.id.as_str()) {
                return Err(AurigaError::validation(
                    "accounts.id",
                    "Account ids must be unique",
                ));
            }
            if account.session_token.is_empty() || account.access_token.is_empty() {
                return Err(AurigaError::validation(
                    "accounts",
                    "Both session_token and access_token are required",
                ));
            }
        }

        Ok(())
    }
}
