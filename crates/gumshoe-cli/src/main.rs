//! `gumshoe` — drive the attribution engine from the command line.
//!
//! A SQLite file stands in for the browser's local storage, so successive
//! `visit` calls behave like successive page views in one browser.
//!
//! # Usage
//!
//! ```
//! gumshoe visit 'https://shop.example/?utm_source=news&gclid=g1' --referrer https://mail.example/
//! gumshoe show
//! gumshoe config --script
//! gumshoe entry stored-entry.json --format html
//! ```

mod config;

use std::{
  io::Read as _,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use gumshoe_core::{
  page::PageContext, populate::HiddenInput, record::Freshness, storage::SlotStorage,
};
use gumshoe_forms::{DisplayFormat, FieldLayout, FieldValue, HostSettings, host};
use gumshoe_store::{AttributionStore, PageSession, ReadyState, SqliteStorage, decode_payload};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(author, version, about = "Marketing attribution capture")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gumshoe.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Simulate one page view and print what the form fields would receive.
  Visit {
    /// Full page URL, including the query string.
    url:      String,
    /// Referring URL, if any.
    #[arg(long)]
    referrer: Option<String>,
    /// Document state when the script starts.
    #[arg(long, value_enum, default_value_t = Readiness::Complete)]
    ready:    Readiness,
    /// Also print the hidden-input markup, filled with the values.
    #[arg(long)]
    inputs:   bool,
  },
  /// Print the stored record, if any.
  Show,
  /// Erase the stored record.
  Clear,
  /// Print the configuration published to the page script.
  Config {
    /// Print the inline script statement instead of bare JSON.
    #[arg(long)]
    script: bool,
  },
  /// Render a stored entry value (JSON file, or `-` for stdin).
  Entry {
    file:   PathBuf,
    #[arg(long, value_enum, default_value_t = EntryFormat::Text)]
    format: EntryFormat,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum Readiness {
  Loading,
  Interactive,
  Complete,
}

impl From<Readiness> for ReadyState {
  fn from(r: Readiness) -> Self {
    match r {
      Readiness::Loading => Self::Loading,
      Readiness::Interactive => Self::Interactive,
      Readiness::Complete => Self::Complete,
    }
  }
}

#[derive(Clone, Copy, ValueEnum)]
enum EntryFormat {
  Html,
  Text,
  Url,
  /// The compact entry-list form.
  Summary,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  match cli.command {
    Command::Visit { url, referrer, ready, inputs } => visit(&cfg, url, referrer, ready, inputs),
    Command::Show => show(&cfg),
    Command::Clear => clear(&cfg),
    Command::Config { script } => print_config(&cfg, script),
    Command::Entry { file, format } => entry(&cfg, &file, format),
  }
}

fn open_storage(cfg: &CliConfig) -> anyhow::Result<SqliteStorage> {
  let path = expand_tilde(&cfg.storage_path);
  SqliteStorage::open(&path).with_context(|| format!("failed to open storage at {path:?}"))
}

fn visit(
  cfg: &CliConfig,
  url: String,
  referrer: Option<String>,
  ready: Readiness,
  inputs: bool,
) -> anyhow::Result<()> {
  let mut page = PageContext::new(url);
  if let Some(referrer) = referrer {
    page = page.with_referrer(referrer);
  }

  let store = AttributionStore::new(cfg.engine(), open_storage(cfg)?);
  let mut session = PageSession::new(store);
  if session.start(ready.into(), page).is_none() {
    tracing::debug!("document still loading, running on ready");
    session.document_ready();
  }
  let outcome = session
    .outcome()
    .context("page session finished without an outcome")?;

  println!(
    "{}",
    serde_json::to_string_pretty(&json!({
      "persisted": outcome.persisted,
      "values": outcome.values,
    }))?
  );

  if inputs {
    let layout = FieldLayout::new(cfg.field_id, cfg.tracking_keys.clone());
    let specs = layout.inputs();
    let mut fields: Vec<HiddenInput> =
      specs.iter().map(|spec| HiddenInput::marked(spec.key.as_str())).collect();
    outcome.populate(fields.iter_mut());

    let filled = specs
      .iter()
      .zip(&fields)
      .map(|(spec, field)| (spec.id.clone(), field.value.clone()))
      .collect();
    println!("{}", layout.render_inputs(1, &FieldValue::Mapping(filled), None));
  }

  Ok(())
}

fn show(cfg: &CliConfig) -> anyhow::Result<()> {
  let storage = open_storage(cfg)?;
  let Some(raw) = storage
    .get_item(&cfg.storage_key)
    .context("failed to read the storage slot")?
  else {
    println!("no record stored under {:?}", cfg.storage_key);
    return Ok(());
  };

  let Some(record) = decode_payload(&raw) else {
    println!("slot {:?} holds an undecodable payload", cfg.storage_key);
    return Ok(());
  };

  let freshness = match record.freshness(Utc::now(), cfg.ttl_seconds) {
    Freshness::Fresh => "fresh",
    Freshness::Expired => "expired",
    Freshness::Unstamped => "unstamped",
  };
  println!(
    "{}",
    serde_json::to_string_pretty(&json!({
      "freshness": freshness,
      "written_at": record.timestamp.map(|t| t.to_rfc3339()),
      "values": record.values,
    }))?
  );
  Ok(())
}

fn clear(cfg: &CliConfig) -> anyhow::Result<()> {
  let mut storage = open_storage(cfg)?;
  storage
    .remove_item(&cfg.storage_key)
    .context("failed to clear the storage slot")?;
  tracing::info!(storage_key = %cfg.storage_key, "cleared stored record");
  Ok(())
}

fn print_config(cfg: &CliConfig, script: bool) -> anyhow::Result<()> {
  let settings = HostSettings {
    storage_key:   cfg.storage_key.clone(),
    ttl_override:  i64::try_from(cfg.ttl_seconds).unwrap_or(i64::MAX),
    tracking_keys: cfg.tracking_keys.clone(),
  };
  let client = host::ensure_initialized(&settings);

  if script {
    println!("{}", host::config_script(client)?);
  } else {
    println!("{}", serde_json::to_string_pretty(client)?);
  }
  Ok(())
}

fn entry(cfg: &CliConfig, file: &Path, format: EntryFormat) -> anyhow::Result<()> {
  let raw = if file == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("failed to read entry from stdin")?;
    buf
  } else {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
  };
  let value: serde_json::Value = serde_json::from_str(&raw).context("entry is not JSON")?;
  let value = FieldValue::from(value);

  let layout = FieldLayout::new(cfg.field_id, cfg.tracking_keys.clone());
  let rendered = match format {
    EntryFormat::Html => layout.entry_detail(&value, DisplayFormat::Html, None),
    EntryFormat::Text => layout.entry_detail(&value, DisplayFormat::Text, None),
    EntryFormat::Url => layout.entry_detail(&value, DisplayFormat::Url, None),
    EntryFormat::Summary => layout.entry_summary(&value),
  };
  println!("{rendered}");
  Ok(())
}

/// Expand a leading `~/` to `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

  #[test]
  fn parses_visit_with_deferred_readiness() {
    let cli = Cli::try_parse_from([
      "gumshoe",
      "visit",
      "https://x.test/?utm_source=a",
      "--ready",
      "loading",
      "--inputs",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Command::Visit { ready: Readiness::Loading, inputs: true, referrer: None, .. }
    ));
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let cfg = CliConfig::load(Path::new("/nonexistent/gumshoe.toml")).unwrap();
    assert_eq!(cfg.storage_key, "gfGumshoe");
    assert_eq!(cfg.ttl_seconds, 3600);
    assert_eq!(cfg.field_id, 1);
    assert_eq!(cfg.tracking_keys.len(), 12);
  }

  #[test]
  fn tilde_expands_only_as_prefix() {
    assert_eq!(expand_tilde(Path::new("/tmp/a.db")), PathBuf::from("/tmp/a.db"));
    assert_eq!(expand_tilde(Path::new("a~/b.db")), PathBuf::from("a~/b.db"));
  }
}
