//! Engine configuration and the client config object the host exposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keys::TrackingKeys;

/// Storage slot used when the host does not name one.
pub const DEFAULT_STORAGE_KEY: &str = "gfGumshoe";

/// Session lifetime the host advertises unless overridden.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

// ─── Engine configuration ────────────────────────────────────────────────────

/// Read-only configuration consumed by the attribution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Identifier of the persistence slot.
  #[serde(default = "default_storage_key")]
  pub storage_key:   String,
  /// Maximum record age in seconds; `0` means the record never expires.
  #[serde(default = "default_ttl_seconds")]
  pub ttl_seconds:   u64,
  #[serde(default)]
  pub tracking_keys: TrackingKeys,
}

fn default_storage_key() -> String { DEFAULT_STORAGE_KEY.to_string() }

fn default_ttl_seconds() -> u64 { DEFAULT_TTL_SECONDS }

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      storage_key:   default_storage_key(),
      ttl_seconds:   DEFAULT_TTL_SECONDS,
      tracking_keys: TrackingKeys::default(),
    }
  }
}

impl EngineConfig {
  /// Interpret whatever object the host exposed, never failing.
  ///
  /// - a missing or empty `storageKey` falls back to [`DEFAULT_STORAGE_KEY`];
  /// - `ttl` accepts numbers and numeric strings, anything else (or a
  ///   negative value) becomes `0`, i.e. no expiry;
  /// - `gumshoeKeys` must be an array; non-string and empty entries are
  ///   skipped, and a missing list recognises no keys at all.
  pub fn from_client_value(value: &Value) -> Self {
    let storage_key = value
      .get("storageKey")
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
      .map_or_else(default_storage_key, str::to_string);

    let ttl_seconds = value.get("ttl").map_or(0, coerce_ttl);

    let tracking_keys = match value.get("gumshoeKeys") {
      Some(Value::Array(items)) => {
        TrackingKeys::new(items.iter().filter_map(Value::as_str))
      }
      _ => TrackingKeys::empty(),
    };

    Self { storage_key, ttl_seconds, tracking_keys }
  }

  /// Like [`EngineConfig::from_client_value`], from raw JSON text. Text that
  /// is not JSON is treated as an empty object.
  pub fn from_client_json(raw: &str) -> Self {
    let value = serde_json::from_str(raw).unwrap_or(Value::Null);
    Self::from_client_value(&value)
  }
}

/// Integer seconds from a loosely typed value. Fractions truncate; strings
/// contribute their leading integer; everything else is `0`.
fn coerce_ttl(value: &Value) -> u64 {
  match value {
    Value::Number(n) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
      .unwrap_or(0),
    Value::String(s) => leading_integer(s),
    _ => 0,
  }
}

fn leading_integer(s: &str) -> u64 {
  let s = s.trim_start();
  if s.starts_with('-') {
    return 0;
  }
  let digits: String = s
    .trim_start_matches('+')
    .chars()
    .take_while(char::is_ascii_digit)
    .collect();
  digits.parse().unwrap_or(0)
}

// ─── Client config object ────────────────────────────────────────────────────

/// The object the host localizes for the page script:
/// `{ storageKey, ttl, gumshoeKeys }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
  pub storage_key:  String,
  pub ttl:          u64,
  pub gumshoe_keys: Vec<String>,
}

impl From<&EngineConfig> for ClientConfig {
  fn from(cfg: &EngineConfig) -> Self {
    Self {
      storage_key:  cfg.storage_key.clone(),
      ttl:          cfg.ttl_seconds,
      gumshoe_keys: cfg.tracking_keys.iter().map(str::to_string).collect(),
    }
  }
}

impl From<ClientConfig> for EngineConfig {
  fn from(client: ClientConfig) -> Self {
    Self {
      storage_key:   if client.storage_key.is_empty() {
        default_storage_key()
      } else {
        client.storage_key
      },
      ttl_seconds:   client.ttl,
      tracking_keys: TrackingKeys::new(client.gumshoe_keys),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn well_formed_client_config() {
    let cfg = EngineConfig::from_client_value(&json!({
      "storageKey": "attrib",
      "ttl": 86400,
      "gumshoeKeys": ["utm_source", "gclid"],
    }));
    assert_eq!(cfg.storage_key, "attrib");
    assert_eq!(cfg.ttl_seconds, 86400);
    assert_eq!(cfg.tracking_keys.iter().collect::<Vec<_>>(), ["utm_source", "gclid"]);
  }

  #[test]
  fn missing_config_degrades_to_no_keys_and_no_expiry() {
    let cfg = EngineConfig::from_client_json("not json at all");
    assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
    assert_eq!(cfg.ttl_seconds, 0);
    assert!(cfg.tracking_keys.is_empty());
  }

  #[test]
  fn ttl_coercion() {
    let ttl = |v: Value| EngineConfig::from_client_value(&json!({ "ttl": v })).ttl_seconds;
    assert_eq!(ttl(json!("7200")), 7200);
    assert_eq!(ttl(json!(" 90s")), 90);
    assert_eq!(ttl(json!("soon")), 0);
    assert_eq!(ttl(json!(-30)), 0);
    assert_eq!(ttl(json!("-30")), 0);
    assert_eq!(ttl(json!(12.9)), 12);
    assert_eq!(ttl(json!(null)), 0);
  }

  #[test]
  fn key_list_skips_junk_entries() {
    let cfg = EngineConfig::from_client_value(&json!({
      "gumshoeKeys": ["utm_source", 3, null, "", "fbclid"],
    }));
    assert_eq!(cfg.tracking_keys.iter().collect::<Vec<_>>(), ["utm_source", "fbclid"]);

    let cfg = EngineConfig::from_client_value(&json!({ "gumshoeKeys": "utm_source" }));
    assert!(cfg.tracking_keys.is_empty());
  }

  #[test]
  fn client_config_uses_camel_case() {
    let client = ClientConfig::from(&EngineConfig::default());
    let value = serde_json::to_value(&client).unwrap();
    assert_eq!(value["storageKey"], "gfGumshoe");
    assert_eq!(value["ttl"], 3600);
    assert_eq!(value["gumshoeKeys"].as_array().unwrap().len(), 12);
  }

  #[test]
  fn engine_config_fills_serde_defaults() {
    let cfg: EngineConfig = serde_json::from_value(json!({ "ttl_seconds": 0 })).unwrap();
    assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
    assert_eq!(cfg.ttl_seconds, 0);
    assert_eq!(cfg.tracking_keys, TrackingKeys::default());
  }
}
