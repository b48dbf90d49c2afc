//! Entry display: re-map stored input ids to key names and render the
//! non-empty pairs as `key: value` lines.

use quick_xml::escape::escape;

use crate::{
  layout::FieldLayout,
  value::{EntryValues, FieldValue},
};

/// How many pairs the compact entry-list summary shows.
pub const SUMMARY_PAIRS: usize = 3;

/// Read-only access to the host's stored entries.
pub trait EntryLookup {
  fn get_record_by_id(&self, id: u64) -> Option<EntryValues>;
}

impl<F> EntryLookup for F
where
  F: Fn(u64) -> Option<EntryValues>,
{
  fn get_record_by_id(&self, id: u64) -> Option<EntryValues> { self(id) }
}

/// The entry currently being displayed, used when the field value itself
/// carries nothing. An id of `0` means "no entry".
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
  pub lookup:   &'a dyn EntryLookup,
  pub entry_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
  /// Escaped `<ul>` list.
  Html,
  /// One pair per line.
  Text,
  /// Pairs joined with `", "`.
  Url,
}

impl FieldLayout {
  /// Every configured key with its stored value (possibly empty), in key
  /// order. Values are looked up by input id, falling back to the bare key
  /// name.
  pub fn tracking_pairs(&self, value: &FieldValue) -> Vec<(String, String)> {
    let source = value.normalize();
    self
      .inputs()
      .into_iter()
      .map(|input| {
        let stored = source
          .get(&input.id)
          .or_else(|| source.get(&input.key))
          .cloned()
          .unwrap_or_default();
        (input.key, stored)
      })
      .collect()
  }

  /// Stored pairs for the entry detail screen, or `""` when there are none.
  pub fn entry_detail(
    &self,
    value: &FieldValue,
    format: DisplayFormat,
    context: Option<EntryRef<'_>>,
  ) -> String {
    let mut pairs = non_empty(self.tracking_pairs(value));

    if pairs.is_empty()
      && let Some(entry) = context.and_then(|c| self.load_entry(c))
    {
      pairs = non_empty(self.tracking_pairs(&FieldValue::Mapping(entry)));
    }

    if pairs.is_empty() {
      return String::new();
    }

    match format {
      DisplayFormat::Text => text_lines(&pairs).join("\n"),
      DisplayFormat::Url => text_lines(&pairs).join(", "),
      DisplayFormat::Html => {
        let items: String = pairs
          .iter()
          .map(|(k, v)| {
            format!("<li><strong>{}:</strong> {}</li>", escape(k.as_str()), escape(v.as_str()))
          })
          .collect();
        format!(r#"<ul class="gumshoe-entry-detail">{items}</ul>"#)
      }
    }
  }

  /// The first [`SUMMARY_PAIRS`] non-empty pairs, comma separated and
  /// HTML-escaped for the entry list.
  pub fn entry_summary(&self, entry: &FieldValue) -> String {
    let pairs = non_empty(self.tracking_pairs(entry));
    let mut lines = text_lines(&pairs);
    lines.truncate(SUMMARY_PAIRS);
    escape(lines.join(", ").as_str()).into_owned()
  }

  fn load_entry(&self, context: EntryRef<'_>) -> Option<EntryValues> {
    if context.entry_id == 0 {
      return None;
    }
    let entry = context.lookup.get_record_by_id(context.entry_id);
    if entry.is_none() {
      tracing::debug!(entry_id = context.entry_id, field_id = self.field_id, "entry not found");
    }
    entry
  }
}

fn non_empty(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
  pairs.into_iter().filter(|(_, v)| !v.is_empty()).collect()
}

fn text_lines(pairs: &[(String, String)]) -> Vec<String> {
  pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect()
}

#[cfg(test)]
mod tests {
  use gumshoe_core::keys::TrackingKeys;

  use super::*;

  fn layout() -> FieldLayout {
    FieldLayout::new(4, TrackingKeys::new(["utm_source", "utm_medium", "gclid", "referrer"]))
  }

  fn entry(pairs: &[(&str, &str)]) -> EntryValues {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn pairs_follow_key_order_with_bare_key_fallback() {
    let value = FieldValue::Mapping(entry(&[("4.3", "g1"), ("utm_source", "news")]));
    let pairs = layout().tracking_pairs(&value);
    assert_eq!(
      pairs,
      [
        ("utm_source".to_string(), "news".to_string()),
        ("utm_medium".to_string(), String::new()),
        ("gclid".to_string(), "g1".to_string()),
        ("referrer".to_string(), String::new()),
      ]
    );
  }

  #[test]
  fn text_and_url_formats_skip_empty_pairs() {
    let value = FieldValue::Mapping(entry(&[("4.1", "news"), ("4.3", "g1")]));
    let l = layout();
    assert_eq!(l.entry_detail(&value, DisplayFormat::Text, None), "utm_source: news\ngclid: g1");
    assert_eq!(l.entry_detail(&value, DisplayFormat::Url, None), "utm_source: news, gclid: g1");
  }

  #[test]
  fn html_format_escapes() {
    let value = FieldValue::Mapping(entry(&[("4.4", "https://x/?a=1&b=<2>")]));
    let html = layout().entry_detail(&value, DisplayFormat::Html, None);
    assert_eq!(
      html,
      r#"<ul class="gumshoe-entry-detail"><li><strong>referrer:</strong> https://x/?a=1&amp;b=&lt;2&gt;</li></ul>"#
    );
  }

  #[test]
  fn empty_value_falls_back_to_the_stored_entry() {
    let lookup = |id: u64| (id == 12).then(|| entry(&[("4.2", "cpc")]));
    let context = EntryRef { lookup: &lookup, entry_id: 12 };

    let detail =
      layout().entry_detail(&FieldValue::default(), DisplayFormat::Text, Some(context));
    assert_eq!(detail, "utm_medium: cpc");

    let missing = EntryRef { lookup: &lookup, entry_id: 13 };
    assert_eq!(layout().entry_detail(&FieldValue::default(), DisplayFormat::Text, Some(missing)), "");

    let none = EntryRef { lookup: &lookup, entry_id: 0 };
    assert_eq!(layout().entry_detail(&FieldValue::default(), DisplayFormat::Text, Some(none)), "");
  }

  #[test]
  fn summary_caps_at_three_pairs() {
    let value = FieldValue::Raw(
      r#"{"4.1":"news","4.2":"email","4.3":"g1","4.4":"https://r/"}"#.into(),
    );
    assert_eq!(
      layout().entry_summary(&value),
      "utm_source: news, utm_medium: email, gclid: g1"
    );
  }

  #[test]
  fn summary_escapes_visitor_supplied_values() {
    let value = FieldValue::Mapping(entry(&[
      ("4.1", "<script>x</script>"),
      ("4.3", r#"a&b "c""#),
    ]));
    let summary = layout().entry_summary(&value);
    assert!(!summary.contains("<script>"));
    assert_eq!(
      summary,
      "utm_source: &lt;script&gt;x&lt;/script&gt;, gclid: a&amp;b &quot;c&quot;"
    );
  }

  #[test]
  fn summary_of_nothing_is_empty() {
    assert_eq!(layout().entry_summary(&FieldValue::Scalar("x".into())), "");
  }
}
