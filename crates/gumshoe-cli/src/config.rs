//! CLI configuration: optional TOML file layered under `GUMSHOE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gumshoe_core::{
  config::{DEFAULT_STORAGE_KEY, DEFAULT_TTL_SECONDS, EngineConfig},
  keys::TrackingKeys,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite file standing in for the browser's local storage.
  #[serde(default = "default_storage_path")]
  pub storage_path:  PathBuf,
  #[serde(default = "default_storage_key")]
  pub storage_key:   String,
  #[serde(default = "default_ttl_seconds")]
  pub ttl_seconds:   u64,
  #[serde(default)]
  pub tracking_keys: TrackingKeys,
  /// Field id used when laying out inputs and reading entries.
  #[serde(default = "default_field_id")]
  pub field_id:      u32,
}

fn default_storage_path() -> PathBuf { PathBuf::from("gumshoe.db") }

fn default_storage_key() -> String { DEFAULT_STORAGE_KEY.to_string() }

fn default_ttl_seconds() -> u64 { DEFAULT_TTL_SECONDS }

fn default_field_id() -> u32 { 1 }

impl CliConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("GUMSHOE")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("tracking_keys"),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }

  pub fn engine(&self) -> EngineConfig {
    EngineConfig {
      storage_key:   self.storage_key.clone(),
      ttl_seconds:   self.ttl_seconds,
      tracking_keys: self.tracking_keys.clone(),
    }
  }
}
