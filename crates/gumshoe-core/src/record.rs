//! The attribution record: the single persisted unit.
//!
//! On the wire a record is a flat JSON object: one string member per tracking
//! key plus a `timestamp` member holding milliseconds since the epoch.
//! Decoding is lenient about member types and strict about the invariants:
//! values are never empty, and a timestamp is either a valid non-negative
//! millisecond count or absent.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Tracking key → value.
pub type Values = BTreeMap<String, String>;

/// Name of the member carrying the last-write time.
pub const TIMESTAMP_FIELD: &str = "timestamp";

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct AttributionRecord {
  pub values:    Values,
  /// Time of the last write. `None` only for records read back from a
  /// payload that carried no usable timestamp.
  pub timestamp: Option<DateTime<Utc>>,
}

/// How a loaded record relates to the configured TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  Fresh,
  Expired,
  /// A TTL is in force but the record carries no timestamp.
  Unstamped,
}

impl AttributionRecord {
  /// Build a record from `values`, dropping empty entries.
  pub fn new(values: Values, timestamp: Option<DateTime<Utc>>) -> Self {
    let values = values.into_iter().filter(|(_, v)| !v.is_empty()).collect();
    Self { values, timestamp }
  }

  pub fn is_empty(&self) -> bool { self.values.is_empty() }

  /// Classify the record against a TTL in seconds (`0` disables expiry).
  ///
  /// A record is expired when strictly more than `ttl_seconds` have passed
  /// since its timestamp. A TTL too large to represent never expires.
  pub fn freshness(&self, now: DateTime<Utc>, ttl_seconds: u64) -> Freshness {
    if ttl_seconds == 0 {
      return Freshness::Fresh;
    }
    let Some(written) = self.timestamp else {
      return Freshness::Unstamped;
    };
    let Some(ttl) = i64::try_from(ttl_seconds).ok().and_then(TimeDelta::try_seconds)
    else {
      return Freshness::Fresh;
    };
    if now.signed_duration_since(written) > ttl {
      Freshness::Expired
    } else {
      Freshness::Fresh
    }
  }

  /// Restrict values to the keys accepted by `keep`.
  pub fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
    self.values.retain(|k, _| keep(k));
  }

  fn from_object(map: Map<String, Value>) -> Self {
    let mut values = Values::new();
    let mut timestamp = None;
    for (key, value) in map {
      if key == TIMESTAMP_FIELD {
        timestamp = decode_timestamp(&value);
      } else if let Some(v) = coerce_scalar(&value) {
        values.insert(key, v);
      }
    }
    Self { values, timestamp }
  }
}

// ─── JSON conversion ─────────────────────────────────────────────────────────

impl TryFrom<Value> for AttributionRecord {
  type Error = Error;

  fn try_from(value: Value) -> Result<Self> {
    match value {
      Value::Object(map) => Ok(Self::from_object(map)),
      _ => Err(Error::NotAnObject),
    }
  }
}

impl From<AttributionRecord> for Value {
  fn from(record: AttributionRecord) -> Self {
    let mut map: Map<String, Value> = record
      .values
      .into_iter()
      .map(|(k, v)| (k, Value::String(v)))
      .collect();
    if let Some(ts) = record.timestamp {
      map.insert(TIMESTAMP_FIELD.to_string(), Value::from(ts.timestamp_millis()));
    }
    Value::Object(map)
  }
}

/// Scalars become strings; nulls, empties and containers are dropped.
fn coerce_scalar(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
  let Value::Number(n) = value else {
    return None;
  };
  let millis = n.as_i64().or_else(|| {
    n.as_f64()
      .filter(|f| f.is_finite() && f.fract() == 0.0)
      .map(|f| f as i64)
  })?;
  if millis < 0 {
    return None;
  }
  DateTime::from_timestamp_millis(millis)
}
