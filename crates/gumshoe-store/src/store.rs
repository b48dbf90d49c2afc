//! The load, capture, merge, derive and persist cycle.
//!
//! Every step that touches storage or decoding degrades instead of failing:
//! an unreadable, undecodable or expired slot reads as "no record", and a
//! failed write is logged and dropped. Nothing here returns an error.

use chrono::{DateTime, SubsecRound as _, Utc};
use gumshoe_core::{
  AttributionRecord, Values,
  attribution::{capture, derive_missing, merge},
  clock::{Clock, SystemClock},
  config::EngineConfig,
  page::PageContext,
  populate::{MarkedField, populate_fields},
  record::Freshness,
  storage::SlotStorage,
};

use crate::encode::{decode_payload, encode_payload};

/// What one page view produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
  /// The merged and derived values, for field population.
  pub values:    Values,
  /// Whether the record reached storage.
  pub persisted: bool,
}

impl RunOutcome {
  /// Write the values into every marked field; see [`populate_fields`].
  pub fn populate<'a, F, I>(&self, fields: I) -> usize
  where
    F: MarkedField + 'a,
    I: IntoIterator<Item = &'a mut F>,
  {
    populate_fields(fields, &self.values)
  }
}

/// The attribution engine, bound to one storage slot.
pub struct AttributionStore<S, C = SystemClock> {
  config:  EngineConfig,
  storage: S,
  clock:   C,
}

impl<S: SlotStorage> AttributionStore<S> {
  pub fn new(config: EngineConfig, storage: S) -> Self {
    Self::with_clock(config, storage, SystemClock)
  }
}

impl<S: SlotStorage, C: Clock> AttributionStore<S, C> {
  pub fn with_clock(config: EngineConfig, storage: S, clock: C) -> Self {
    Self { config, storage, clock }
  }

  pub fn config(&self) -> &EngineConfig { &self.config }

  pub fn storage(&self) -> &S { &self.storage }

  pub fn storage_mut(&mut self) -> &mut S { &mut self.storage }

  pub fn clock(&self) -> &C { &self.clock }

  pub fn into_storage(self) -> S { self.storage }

  /// Read the persisted record, if there is a usable one.
  ///
  /// Returns `None` when the slot is empty, unreadable or undecodable; when
  /// a TTL is configured and the record has no timestamp; or when the record
  /// is expired, in which case the slot is also erased. Values under keys the
  /// configuration does not admit are dropped.
  pub fn load(&mut self) -> Option<AttributionRecord> {
    let key = self.config.storage_key.as_str();
    let raw = match self.storage.get_item(key) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        tracing::warn!(storage_key = key, error = %e, "attribution storage unreadable");
        return None;
      }
    };

    let Some(mut record) = decode_payload(&raw) else {
      tracing::debug!(storage_key = key, "stored attribution payload is undecodable");
      return None;
    };

    match record.freshness(self.clock.now(), self.config.ttl_seconds) {
      Freshness::Fresh => {}
      Freshness::Unstamped => {
        tracing::debug!(storage_key = key, "ignoring attribution record without timestamp");
        return None;
      }
      Freshness::Expired => {
        tracing::debug!(storage_key = key, "attribution record expired");
        if let Err(e) = self.storage.remove_item(key) {
          tracing::warn!(storage_key = key, error = %e, "failed to erase expired record");
        }
        return None;
      }
    }

    let keys = &self.config.tracking_keys;
    record.retain_keys(|k| keys.admits(k));
    Some(record)
  }

  /// Tracking values present in the page's query string.
  pub fn capture_from_page(&self, page: &PageContext) -> Values {
    capture(page, &self.config.tracking_keys)
  }

  /// Stamp `values` with the current time and write them to the slot.
  ///
  /// Returns the record as written, or `None` if it could not be encoded or
  /// stored.
  pub fn persist(&mut self, values: Values) -> Option<AttributionRecord> {
    let record = AttributionRecord::new(values, Some(self.now_millis()));
    let key = self.config.storage_key.as_str();

    let Some(payload) = encode_payload(&record) else {
      tracing::warn!(storage_key = key, "attribution record could not be encoded");
      return None;
    };

    match self.storage.set_item(key, &payload) {
      Ok(()) => Some(record),
      Err(e) => {
        tracing::warn!(storage_key = key, error = %e, "attribution write dropped");
        None
      }
    }
  }

  /// Run one page view.
  ///
  /// The record is only written when there is attribution to keep, i.e. the
  /// stored and freshly captured values are not both empty. Derived values
  /// are returned either way so fields can be populated from memory.
  pub fn run(&mut self, page: &PageContext) -> RunOutcome {
    let existing = self.load();
    let fresh = self.capture_from_page(page);

    let merged = merge(existing.as_ref().map(|r| &r.values), &fresh);
    let has_attribution = !merged.is_empty();
    let values = derive_missing(merged, page);

    let persisted = has_attribution && self.persist(values.clone()).is_some();
    tracing::debug!(
      captured = fresh.len(),
      restored = existing.is_some(),
      persisted,
      "attribution run complete"
    );

    RunOutcome { values, persisted }
  }

  /// Millisecond precision, matching what the payload can carry.
  fn now_millis(&self) -> DateTime<Utc> { self.clock.now().trunc_subsecs(3) }
}
