//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static files served next to the skill endpoint.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "atomic_skill=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`apply_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = read_config_file(path)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Reads `path` without consulting the environment. A missing file yields
/// the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn read_config_file(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::FileRead(e)),
        },
        None => Ok(Config::default()),
    }
}

/// Applies overrides looked up through `var`.
///
/// - `ATOMIC_HOST` overrides `server.host`
/// - `ATOMIC_PORT` overrides `server.port`
/// - `ATOMIC_PUBLIC_DIR` overrides `server.public_dir`
/// - `ATOMIC_LOG_LEVEL` overrides `logging.level`
/// - `ATOMIC_LOG_JSON` overrides `logging.json` (set to "true" or "1" to enable)
///
/// Unparseable host and port values are ignored.
pub fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("ATOMIC_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        } else {
            tracing::warn!(value = %host, "ignoring unparseable ATOMIC_HOST");
        }
    }
    if let Some(port) = var("ATOMIC_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        } else {
            tracing::warn!(value = %port, "ignoring unparseable ATOMIC_PORT");
        }
    }
    if let Some(dir) = var("ATOMIC_PUBLIC_DIR") {
        config.server.public_dir = dir;
    }
    if let Some(level) = var("ATOMIC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ATOMIC_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
