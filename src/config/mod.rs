//! Configuration module for frameql.
//!
//! Render configs for SQL/Pure generation and TOML-backed settings.

mod render;
mod settings;

pub use render::{FrameToPureConfig, FrameToSqlConfig};
pub use settings::{
    expand_env_vars, PureSettings, ServerSettings, Settings, SettingsError, SqlSettings,
};
