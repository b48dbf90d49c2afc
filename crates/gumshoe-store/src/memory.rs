//! An in-process [`SlotStorage`].

use std::collections::HashMap;

use gumshoe_core::storage::SlotStorage;

use crate::{Error, Result};

/// A `HashMap`-backed storage area with an optional byte quota.
///
/// The quota counts the UTF-8 length of every key and value, which is close
/// enough to how browsers account local storage to exercise the
/// quota-exceeded path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  items:       HashMap<String, String>,
  quota:       Option<usize>,
  unavailable: bool,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// A storage area that refuses writes beyond `bytes`.
  pub fn with_quota(bytes: usize) -> Self {
    Self { quota: Some(bytes), ..Self::default() }
  }

  /// A storage area whose every operation fails, as when the visitor has
  /// blocked site data.
  pub fn unavailable() -> Self {
    Self { unavailable: true, ..Self::default() }
  }

  /// Direct access for seeding and inspection, bypassing quota checks.
  pub fn items(&self) -> &HashMap<String, String> { &self.items }

  pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.items.insert(key.into(), value.into());
  }

  fn used_bytes_without(&self, key: &str) -> usize {
    self
      .items
      .iter()
      .filter(|(k, _)| k.as_str() != key)
      .map(|(k, v)| k.len() + v.len())
      .sum()
  }

  fn ensure_available(&self) -> Result<()> {
    if self.unavailable { Err(Error::Unavailable) } else { Ok(()) }
  }
}

impl SlotStorage for MemoryStorage {
  type Error = Error;

  fn get_item(&self, key: &str) -> Result<Option<String>> {
    self.ensure_available()?;
    Ok(self.items.get(key).cloned())
  }

  fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
    self.ensure_available()?;
    if let Some(quota) = self.quota {
      let needed = self.used_bytes_without(key) + key.len() + value.len();
      if needed > quota {
        return Err(Error::QuotaExceeded { needed, quota });
      }
    }
    self.items.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(&mut self, key: &str) -> Result<()> {
    self.ensure_available()?;
    self.items.remove(key);
    Ok(())
  }
}
