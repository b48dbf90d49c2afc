//! The ordered list of tracking keys the engine recognises.

use serde::{Deserialize, Serialize};

/// Key filled from the full URL of the first page view.
pub const LANDING_PAGE: &str = "landing_page";
/// Key filled from the raw query string of the first page view.
pub const LANDING_QUERY: &str = "landing_query";
/// Key filled from the browser-reported referrer.
pub const REFERRER: &str = "referrer";

/// Keys computed from page context rather than read from the query string.
pub const DERIVED_KEYS: [&str; 3] = [LANDING_PAGE, LANDING_QUERY, REFERRER];

/// Keys recognised when the host does not supply its own list.
pub const DEFAULT_TRACKING_KEYS: [&str; 12] = [
  "utm_source",
  "utm_medium",
  "utm_campaign",
  "utm_content",
  "utm_term",
  "gclid",
  "fbclid",
  "msclkid",
  "ttclid",
  LANDING_PAGE,
  LANDING_QUERY,
  REFERRER,
];

/// An ordered list of tracking keys.
///
/// Order matters to the form integration, which assigns each key a stable
/// positional index. Empty names are dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TrackingKeys(Vec<String>);

impl TrackingKeys {
  pub fn new<I, S>(keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(
      keys
        .into_iter()
        .map(Into::into)
        .filter(|k| !k.is_empty())
        .collect(),
    )
  }

  /// A list that recognises nothing: no query extraction, no population.
  pub fn empty() -> Self { Self(Vec::new()) }

  pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, key: &str) -> bool { self.0.iter().any(|k| k == key) }

  /// Whether a stored value under `key` may be read back into the engine.
  ///
  /// Derived keys are always admitted since the engine writes them
  /// regardless of the configured list.
  pub fn admits(&self, key: &str) -> bool {
    self.contains(key) || DERIVED_KEYS.contains(&key)
  }

  /// Zero-based position of `key` in the list.
  pub fn position(&self, key: &str) -> Option<usize> {
    self.0.iter().position(|k| k == key)
  }
}

impl Default for TrackingKeys {
  fn default() -> Self { Self::new(DEFAULT_TRACKING_KEYS) }
}

impl From<Vec<String>> for TrackingKeys {
  fn from(keys: Vec<String>) -> Self { Self::new(keys) }
}

impl From<TrackingKeys> for Vec<String> {
  fn from(keys: TrackingKeys) -> Self { keys.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_list_keeps_declared_order() {
    let keys = TrackingKeys::default();
    assert_eq!(keys.len(), 12);
    assert_eq!(keys.position("utm_source"), Some(0));
    assert_eq!(keys.position(REFERRER), Some(11));
  }

  #[test]
  fn empty_names_are_dropped() {
    let keys = TrackingKeys::new(["utm_source", "", "gclid"]);
    assert_eq!(keys.iter().collect::<Vec<_>>(), ["utm_source", "gclid"]);
  }

  #[test]
  fn derived_keys_are_admitted_even_when_unlisted() {
    let keys = TrackingKeys::new(["utm_source"]);
    assert!(keys.admits("utm_source"));
    assert!(keys.admits(LANDING_PAGE));
    assert!(!keys.admits("gclid"));
  }
}
