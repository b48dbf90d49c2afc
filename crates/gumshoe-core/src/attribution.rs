//! Capture, merge and derive. The pure half of the attribution engine.
//!
//! Nothing here touches storage or the clock, so each rule can be exercised
//! in isolation.

use crate::{
  keys::{LANDING_PAGE, LANDING_QUERY, REFERRER, TrackingKeys},
  page::PageContext,
  record::Values,
};

/// Values for every configured key present in the page's query string.
///
/// Only the first occurrence of a key counts, and a key whose first
/// occurrence is empty is omitted even if a later one carries a value.
pub fn capture(page: &PageContext, keys: &TrackingKeys) -> Values {
  let mut values = Values::new();
  if keys.is_empty() {
    return values;
  }
  for (name, value) in page.query_pairs() {
    if keys.contains(&name) && !values.contains_key(&*name) {
      values.insert(name.into_owned(), value.into_owned());
    }
  }
  values.retain(|_, v| !v.is_empty());
  values
}

/// Overlay `fresh` on `existing`: a key set in `fresh` always wins, every
/// other stored key is kept. Empty values never reach the result.
pub fn merge(existing: Option<&Values>, fresh: &Values) -> Values {
  let mut merged = existing.cloned().unwrap_or_default();
  merged.retain(|_, v| !v.is_empty());
  for (key, value) in fresh {
    if !value.is_empty() {
      merged.insert(key.clone(), value.clone());
    }
  }
  merged
}

/// Fill the derived keys that are still absent or empty.
///
/// `landing_page` and `landing_query` always end up present (the latter may
/// be the empty string); `referrer` only when the page reported one. A value
/// captured on an earlier page view is never replaced.
pub fn derive_missing(mut values: Values, page: &PageContext) -> Values {
  fill(&mut values, LANDING_PAGE, page.href());
  fill(&mut values, LANDING_QUERY, page.search());
  if let Some(referrer) = page.referrer() {
    fill(&mut values, REFERRER, referrer);
  }
  values
}

fn fill(values: &mut Values, key: &str, value: &str) {
  match values.get_mut(key) {
    Some(current) if !current.is_empty() => {}
    Some(current) => value.clone_into(current),
    None => {
      values.insert(key.to_string(), value.to_string());
    }
  }
}
