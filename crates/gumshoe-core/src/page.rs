//! The page view the engine runs against.

use url::{Url, form_urlencoded};

/// What the engine can observe about the current page: its URL and the
/// referrer the browser reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
  href:     String,
  /// Query string in `location.search` form: `?` followed by the query, or
  /// empty when there is none.
  search:   String,
  referrer: Option<String>,
}

impl PageContext {
  /// Build a context from the page address.
  ///
  /// Absolute URLs are normalised the way a browser reports `location.href`.
  /// Anything unparseable is kept verbatim and its query is split off by
  /// hand.
  pub fn new(href: impl Into<String>) -> Self {
    let raw = href.into();
    match Url::parse(&raw) {
      Ok(url) => Self {
        search:   search_of(url.query()),
        href:     url.into(),
        referrer: None,
      },
      Err(_) => {
        let query = raw
          .split_once('?')
          .map(|(_, rest)| rest.split_once('#').map_or(rest, |(q, _)| q));
        Self { search: search_of(query), href: raw, referrer: None }
      }
    }
  }

  /// Attach the browser-reported referrer. Empty strings mean "none".
  pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
    let referrer = referrer.into();
    self.referrer = (!referrer.is_empty()).then_some(referrer);
    self
  }

  pub fn href(&self) -> &str { &self.href }

  pub fn search(&self) -> &str { &self.search }

  pub fn referrer(&self) -> Option<&str> { self.referrer.as_deref() }

  /// First value for `key` in the query string, form-urlencoded decoded.
  pub fn query_value(&self, key: &str) -> Option<String> {
    self
      .query_pairs()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.into_owned())
  }

  /// All decoded query pairs in document order.
  pub fn query_pairs(&self) -> form_urlencoded::Parse<'_> {
    let query = self.search.strip_prefix('?').unwrap_or(&self.search);
    form_urlencoded::parse(query.as_bytes())
  }
}

fn search_of(query: Option<&str>) -> String {
  match query {
    Some(q) if !q.is_empty() => format!("?{q}"),
    _ => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_query_from_absolute_url() {
    let page = PageContext::new("https://example.com/pricing?utm_source=ads&x=1#top");
    assert_eq!(page.href(), "https://example.com/pricing?utm_source=ads&x=1#top");
    assert_eq!(page.search(), "?utm_source=ads&x=1");
    assert_eq!(page.query_value("utm_source").as_deref(), Some("ads"));
  }

  #[test]
  fn bare_question_mark_is_no_query() {
    let page = PageContext::new("https://example.com/?");
    assert_eq!(page.search(), "");
    assert_eq!(page.query_value("utm_source"), None);
  }

  #[test]
  fn decodes_form_urlencoding_and_takes_first_occurrence() {
    let page =
      PageContext::new("https://example.com/?utm_term=red+shoes%21&utm_term=second");
    assert_eq!(page.query_value("utm_term").as_deref(), Some("red shoes!"));
  }

  #[test]
  fn relative_addresses_fall_back_to_manual_split() {
    let page = PageContext::new("/landing?gclid=abc#frag");
    assert_eq!(page.href(), "/landing?gclid=abc#frag");
    assert_eq!(page.search(), "?gclid=abc");
    assert_eq!(page.query_value("gclid").as_deref(), Some("abc"));
  }

  #[test]
  fn empty_referrer_is_none() {
    let page = PageContext::new("https://example.com/").with_referrer("");
    assert_eq!(page.referrer(), None);
    let page = page.with_referrer("https://google.com/");
    assert_eq!(page.referrer(), Some("https://google.com/"));
  }
}
