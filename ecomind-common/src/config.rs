//! Configuration loading and resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together as
//! [`ConfigOverrides`] (clap reads both). A missing TOML file is not an
//! error; a malformed one is.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "ECOMIND_CONFIG";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// TOML config file contents; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// ONNX export of the waste classifier
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Eco tip file, one tip per line
    #[serde(default)]
    pub tips_path: Option<PathBuf>,
    /// Sessions idle longer than this are discarded
    #[serde(default)]
    pub session_idle_minutes: Option<u64>,
    /// Fixed seed for tip selection (reproducible runs)
    #[serde(default)]
    pub tip_seed: Option<u64>,
    #[serde(default)]
    pub max_upload_mb: Option<usize>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub tips_path: PathBuf,
    pub session_idle_minutes: u64,
    pub max_upload_mb: usize,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from("waste_classifier_binary.onnx"),
            tips_path: PathBuf::from("tips.txt"),
            session_idle_minutes: 60,
            max_upload_mb: 10,
            log_level: default_log_level(),
        }
    }
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Values supplied on the command line or via environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub tips_path: Option<PathBuf>,
    pub session_idle_minutes: Option<u64>,
    pub tip_seed: Option<u64>,
    pub max_upload_mb: Option<usize>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub tips_path: PathBuf,
    pub session_idle_minutes: u64,
    pub tip_seed: Option<u64>,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, TOML and compiled defaults
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::new();

        let session_idle_minutes = overrides
            .session_idle_minutes
            .or(toml.session_idle_minutes)
            .unwrap_or(defaults.session_idle_minutes);
        if session_idle_minutes == 0 {
            return Err(Error::Config(
                "session_idle_minutes must be greater than zero".to_string(),
            ));
        }
        idle_duration(session_idle_minutes)?;

        let max_upload_mb = overrides
            .max_upload_mb
            .or(toml.max_upload_mb)
            .unwrap_or(defaults.max_upload_mb);
        if max_upload_mb == 0 {
            return Err(Error::Config("max_upload_mb must be greater than zero".to_string()));
        }
        let max_upload_bytes = max_upload_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            Error::Config(format!("max_upload_mb {} is too large", max_upload_mb))
        })?;

        Ok(Self {
            host: overrides
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or(defaults.host),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            model_path: overrides
                .model_path
                .clone()
                .or_else(|| toml.model_path.clone())
                .unwrap_or(defaults.model_path),
            tips_path: overrides
                .tips_path
                .clone()
                .or_else(|| toml.tips_path.clone())
                .unwrap_or(defaults.tips_path),
            session_idle_minutes,
            tip_seed: overrides.tip_seed.or(toml.tip_seed),
            max_upload_bytes,
            log_level: overrides
                .log_level
                .clone()
                .unwrap_or_else(|| toml.logging.level.clone()),
        })
    }

    /// Inactivity window after which a session is dropped
    pub fn idle_timeout(&self) -> Result<chrono::Duration> {
        idle_duration(self.session_idle_minutes)
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn idle_duration(minutes: u64) -> Result<chrono::Duration> {
    i64::try_from(minutes)
        .ok()
        .and_then(chrono::Duration::try_minutes)
        .ok_or_else(|| Error::Config(format!("session_idle_minutes {} is too large", minutes)))
}

/// Locate the TOML config file
///
/// Explicit path first, then `ECOMIND_CONFIG`, then the platform config
/// directory (`~/.config/ecomind/ecomind.toml` on Linux).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("ecomind").join("ecomind.toml"))
}

/// Load a TOML config file; a missing file yields defaults
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
