//! Positional input layout and hidden-input markup.

use gumshoe_core::{keys::TrackingKeys, populate::MARKER_ATTRIBUTE};
use quick_xml::escape::escape;

use crate::value::{EntryValues, FieldValue};

/// One sub-input of the tracking field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
  /// `{field_id}.{index}`, the identifier values are stored under.
  pub id:    String,
  /// The tracking key this input carries.
  pub key:   String,
  /// One-based position of the key in the configured list.
  pub index: usize,
}

impl InputSpec {
  /// Form-post name: the id with its dot replaced.
  pub fn field_name(&self) -> String { format!("input_{}", self.id.replace('.', "_")) }

  /// DOM id, unique across forms on the page.
  pub fn element_id(&self, form_id: u32) -> String {
    format!("input_{form_id}_{}", self.id.replace('.', "_"))
  }
}

/// Maps an ordered key list onto the sub-inputs of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
  pub field_id: u32,
  pub keys:     TrackingKeys,
}

impl FieldLayout {
  pub fn new(field_id: u32, keys: TrackingKeys) -> Self { Self { field_id, keys } }

  pub fn inputs(&self) -> Vec<InputSpec> {
    self
      .keys
      .iter()
      .enumerate()
      .map(|(i, key)| InputSpec {
        id:    self.input_id(i + 1),
        key:   key.to_string(),
        index: i + 1,
      })
      .collect()
  }

  pub fn input_id(&self, index: usize) -> String { format!("{}.{index}", self.field_id) }

  /// Hidden inputs for the page script to fill, one per key, in a container
  /// kept out of layout.
  ///
  /// Each input starts from `value` (its own mapping entry, or the scalar)
  /// and a stored `entry` value for the same input id overrides it. An empty
  /// key list renders nothing.
  pub fn render_inputs(
    &self,
    form_id: u32,
    value: &FieldValue,
    entry: Option<&EntryValues>,
  ) -> String {
    let inputs = self.inputs();
    if inputs.is_empty() {
      return String::new();
    }

    let mut tags = String::new();
    for input in &inputs {
      let current = entry
        .and_then(|e| e.get(&input.id).cloned())
        .or_else(|| value.current_for(&input.id))
        .unwrap_or_default();

      tags.push_str(&format!(
        r#"<input type="hidden" id="{}" name="{}" value="{}" {MARKER_ATTRIBUTE}="{}" />"#,
        escape(input.element_id(form_id).as_str()),
        escape(input.field_name().as_str()),
        escape(current.as_str()),
        escape(input.key.as_str()),
      ));
    }

    format!(
      r#"<div class="gumshoe-field ginput_container" style="display:none" aria-hidden="true">{tags}</div>"#
    )
  }
}
