//! Server configuration parsed from environment variables.

use crate::emulator::IdStrategy;
use crate::fixtures::DEFAULT_GATE_ID;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub is_admin: bool,
    pub id_strategy: IdStrategy,
    pub default_gate_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            is_admin: false,
            id_strategy: IdStrategy::Sequential,
            default_gate_id: DEFAULT_GATE_ID.to_string(),
        }
    }
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `QG_ADMIN`: `true` / `false` (default), initial admin flag
    /// - `QG_ID_STRATEGY`: `sequential` (default) or `random`
    /// - `QG_DEFAULT_GATE_ID`: id of the seeded default gate
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let is_admin = parse_bool("QG_ADMIN", std::env::var("QG_ADMIN").ok().as_deref())?;
        let id_strategy = parse_id_strategy(std::env::var("QG_ID_STRATEGY").ok().as_deref())?;
        let default_gate_id = std::env::var("QG_DEFAULT_GATE_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GATE_ID.to_string());

        Ok(Self { port, is_admin, id_strategy, default_gate_id })
    }
}

/// Load variables from an env file, keeping any already set in the process.
/// Returns whether the file was loaded; failures are logged, not fatal.
#[must_use]
pub fn load_env_file(path: impl AsRef<std::path::Path>) -> bool {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "env file not loaded");
            false
        }
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::Parse(format!("invalid PORT: {v}"))),
    }
}

fn parse_bool(key: &str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(ConfigError::Parse(format!("invalid {key}: {other}"))),
    }
}

fn parse_id_strategy(raw: Option<&str>) -> Result<IdStrategy, ConfigError> {
    match raw.unwrap_or("sequential").trim() {
        "sequential" => Ok(IdStrategy::Sequential),
        "random" => Ok(IdStrategy::Random),
        other => Err(ConfigError::Parse(format!(
            "unsupported QG_ID_STRATEGY '{other}' (expected 'sequential' or 'random')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
