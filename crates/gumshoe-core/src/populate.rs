//! Field population: writing merged values into marked page elements.

use crate::record::Values;

/// Attribute naming the tracking key an element should receive.
pub const MARKER_ATTRIBUTE: &str = "data-gumshoe";

/// A page element that may carry the marker attribute.
pub trait MarkedField {
  /// The tracking key named by the marker attribute, if any.
  fn marker(&self) -> Option<&str>;

  fn set_value(&mut self, value: &str);
}

/// A detached hidden input, as rendered by the form integration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenInput {
  pub marker: Option<String>,
  pub value:  String,
}

impl HiddenInput {
  pub fn marked(key: impl Into<String>) -> Self {
    Self { marker: Some(key.into()), value: String::new() }
  }
}

impl MarkedField for HiddenInput {
  fn marker(&self) -> Option<&str> { self.marker.as_deref() }

  fn set_value(&mut self, value: &str) { value.clone_into(&mut self.value); }
}

/// Set every marked field to its key's value, or to `""` when the key is
/// absent. Fields with no (or an empty) marker are left alone.
///
/// Returns how many fields were written.
pub fn populate_fields<'a, F, I>(fields: I, values: &Values) -> usize
where
  F: MarkedField + 'a,
  I: IntoIterator<Item = &'a mut F>,
{
  let mut written = 0;
  for field in fields {
    let Some(key) = field.marker().filter(|k| !k.is_empty()) else {
      continue;
    };
    let value = values.get(key).map_or("", String::as_str).to_owned();
    field.set_value(&value);
    written += 1;
  }
  written
}
