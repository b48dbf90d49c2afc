//! The shapes a submitted or stored field value can arrive in.

use std::collections::BTreeMap;

use serde_json::Value;

/// Input id (or bare key name) → stored string.
pub type EntryValues = BTreeMap<String, String>;

/// A field value as handed over by the host.
///
/// Depending on the call path the host passes a single scalar, an
/// associative structure keyed by input id, or that structure serialised to
/// a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Scalar(String),
  Mapping(EntryValues),
  Raw(String),
}

impl FieldValue {
  /// The canonical mapping for this value.
  ///
  /// Mappings pass through. Raw strings are read as a JSON object whose
  /// scalar members become strings; anything else, and any scalar, is an
  /// empty mapping.
  pub fn normalize(&self) -> EntryValues {
    match self {
      Self::Mapping(map) => map.clone(),
      Self::Raw(raw) => match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => obj
          .iter()
          .filter_map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
          .collect(),
        _ => EntryValues::new(),
      },
      Self::Scalar(_) => EntryValues::new(),
    }
  }

  /// The value an individual input should show. A scalar applies to every
  /// input; otherwise the input's own entry in the mapping.
  pub fn current_for(&self, input_id: &str) -> Option<String> {
    match self {
      Self::Scalar(s) => Some(s.clone()),
      Self::Mapping(map) => map.get(input_id).cloned(),
      Self::Raw(_) => self.normalize().remove(input_id),
    }
  }
}

impl Default for FieldValue {
  fn default() -> Self { Self::Scalar(String::new()) }
}

impl From<Value> for FieldValue {
  fn from(value: Value) -> Self {
    match value {
      Value::Object(obj) => Self::Mapping(
        obj
          .iter()
          .filter_map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
          .collect(),
      ),
      Value::String(s) => Self::Raw(s),
      Value::Number(n) => Self::Scalar(n.to_string()),
      Value::Bool(b) => Self::Scalar(b.to_string()),
      Value::Null | Value::Array(_) => Self::Mapping(EntryValues::new()),
    }
  }
}

fn scalar_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn raw_json_object_normalizes_to_mapping() {
    let raw = FieldValue::Raw(r#"{"7.1":"newsletter","7.2":3,"7.3":null}"#.into());
    let map = raw.normalize();
    assert_eq!(map.len(), 2);
    assert_eq!(map["7.1"], "newsletter");
    assert_eq!(map["7.2"], "3");
  }

  #[test]
  fn unreadable_raw_and_scalars_normalize_to_empty() {
    assert!(FieldValue::Raw("a:1:{i:0;s:1:\"x\";}".into()).normalize().is_empty());
    assert!(FieldValue::Raw("[1,2]".into()).normalize().is_empty());
    assert!(FieldValue::Scalar("x".into()).normalize().is_empty());
  }

  #[test]
  fn scalar_applies_to_every_input() {
    let v = FieldValue::Scalar("same".into());
    assert_eq!(v.current_for("7.1").as_deref(), Some("same"));
    assert_eq!(v.current_for("7.9").as_deref(), Some("same"));
  }

  #[test]
  fn from_json_picks_the_variant() {
    assert!(matches!(FieldValue::from(json!({"7.1": "a"})), FieldValue::Mapping(_)));
    assert!(matches!(FieldValue::from(json!("{}")), FieldValue::Raw(_)));
    assert_eq!(FieldValue::from(json!(5)), FieldValue::Scalar("5".into()));
    assert_eq!(FieldValue::from(json!(null)), FieldValue::Mapping(EntryValues::new()));
  }
}
