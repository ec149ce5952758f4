//! TOML-based configuration for frameql.
//!
//! Supports a config file (frameql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [sql]
//! database_type = "Postgres"
//! pretty = true
//!
//! [pure]
//! pretty = false
//! indent_step = 2
//!
//! [server]
//! host = "${LEGEND_HOST}"
//! port = 6300
//! secure = false
//! path_prefix = "/engine"
//! chunk_size = 1000
//! retry_count = 2
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::render::{FrameToPureConfig, FrameToSqlConfig};
use crate::execution::HttpLegendClient;
use crate::sql::dialect::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQL generation settings.
    pub sql: SqlSettings,

    /// Pure generation settings.
    pub pure: PureSettings,

    /// Execution server settings.
    pub server: ServerSettings,
}

/// SQL generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Target database type ("Postgres", "TSql").
    pub database_type: String,

    /// Multi-line, indented output.
    pub pretty: bool,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            database_type: "Postgres".to_string(),
            pretty: true,
        }
    }
}

/// Pure generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PureSettings {
    pub pretty: bool,

    /// Spaces per indent level.
    pub indent_step: usize,
}

impl Default for PureSettings {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_step: 2,
        }
    }
}

/// Execution server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host name (supports ${ENV_VAR} expansion).
    pub host: String,

    pub port: u16,

    /// Use https.
    pub secure: bool,

    /// Path prefix in front of `/api/...` (supports ${ENV_VAR} expansion).
    pub path_prefix: Option<String>,

    /// Rows per streamed chunk; `None` lets the server decide.
    pub chunk_size: Option<u32>,

    /// Retries per request on 500-504 responses (at least 1).
    pub retry_count: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6300,
            secure: false,
            path_prefix: None,
            chunk_size: None,
            retry_count: 2,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `FRAMEQL_CONFIG`
    /// 2. `./frameql.toml`
    /// 3. `~/.config/frameql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("FRAMEQL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("frameql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("frameql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// SQL render config for the configured database type.
    pub fn sql_config(&self) -> Result<FrameToSqlConfig, SettingsError> {
        let dialect: Dialect = self
            .sql
            .database_type
            .parse()
            .map_err(|e: crate::error::FrameError| SettingsError::InvalidConfig(e.to_string()))?;
        Ok(FrameToSqlConfig::new(dialect, self.sql.pretty))
    }

    /// Pure render config.
    pub fn pure_config(&self) -> FrameToPureConfig {
        FrameToPureConfig {
            pretty: self.pure.pretty,
            indent: 0,
            indent_step: self.pure.indent_step,
        }
    }

    /// HTTP client for the configured execution server.
    pub fn client(&self) -> Result<HttpLegendClient, SettingsError> {
        let host = expand_env_vars(&self.server.host)?;
        let prefix = self
            .server
            .path_prefix
            .as_deref()
            .map(expand_env_vars)
            .transpose()?;
        HttpLegendClient::new(
            &host,
            self.server.port,
            self.server.secure,
            prefix.as_deref(),
            self.server.retry_count,
        )
        .map_err(|e| SettingsError::InvalidConfig(e.to_string()))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            let name = chars.by_ref().take_while(|ch| *ch != '}').collect();
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
