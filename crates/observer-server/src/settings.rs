//! [`ServerConfig`]: a TOML file layered under `OBSERVER_*` environment
//! variables.

use std::path::{Path, PathBuf};

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:      String,
  #[serde(default = "default_port")]
  pub port:      u16,
  /// Guilds to track. Empty tracks every guild the relay reports.
  #[serde(default)]
  pub guild_ids: Vec<u64>,
  pub store:     StoreConfig,
}

/// Which event store backs this deployment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
  Sqlite {
    path:            PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    busy_timeout_ms: u64,
  },
  Document {
    path: PathBuf,
  },
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_busy_timeout_ms() -> u64 { 5000 }

impl ServerConfig {
  /// Read `file` (optional) and then `env` over it.
  pub fn load(file: &Path, env: Environment) -> Result<Self, ConfigError> {
    config::Config::builder()
      .add_source(File::from(file).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// `OBSERVER_PORT=9000`, `OBSERVER_STORE__PATH=...`,
/// `OBSERVER_GUILD_IDS=1;2;3`.
pub fn environment() -> Environment {
  Environment::with_prefix("OBSERVER")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
    .list_separator(";")
    .with_list_parse_key("guild_ids")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
