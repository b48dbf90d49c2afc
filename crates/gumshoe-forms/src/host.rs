//! Host-side settings and the one-time client registration.

use std::sync::OnceLock;

use gumshoe_core::{
  config::{ClientConfig, DEFAULT_STORAGE_KEY, DEFAULT_TTL_SECONDS, EngineConfig},
  keys::TrackingKeys,
};

use crate::Result;

/// Type identifier of the tracking field.
pub const FIELD_TYPE: &str = "gumshoe";

/// Name of the page global the client config is published under.
pub const CONFIG_GLOBAL: &str = "gumshoeConfig";

/// Settings as the host's filters produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
  pub storage_key:   String,
  /// Raw, possibly non-positive, TTL override; see
  /// [`HostSettings::ttl_seconds`].
  pub ttl_override:  i64,
  pub tracking_keys: TrackingKeys,
}

impl Default for HostSettings {
  fn default() -> Self {
    Self {
      storage_key:   DEFAULT_STORAGE_KEY.to_string(),
      ttl_override:  DEFAULT_TTL_SECONDS as i64,
      tracking_keys: TrackingKeys::default(),
    }
  }
}

impl HostSettings {
  /// The advertised TTL. The host never publishes "no expiry": a
  /// non-positive override falls back to [`DEFAULT_TTL_SECONDS`].
  pub fn ttl_seconds(&self) -> u64 {
    u64::try_from(self.ttl_override)
      .ok()
      .filter(|ttl| *ttl > 0)
      .unwrap_or(DEFAULT_TTL_SECONDS)
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      storage_key:   self.storage_key.clone(),
      ttl_seconds:   self.ttl_seconds(),
      tracking_keys: self.tracking_keys.clone(),
    }
  }

  pub fn client_config(&self) -> ClientConfig { ClientConfig::from(&self.engine_config()) }
}

/// Whether any of a form's field types is the tracking field, i.e. whether
/// the page script is needed at all.
pub fn form_contains_tracking_field<'a>(field_types: impl IntoIterator<Item = &'a str>) -> bool {
  field_types.into_iter().any(|t| t == FIELD_TYPE)
}

/// Drop every tracking field after the first, keeping the order of the rest.
///
/// A form carries at most one tracking field; extra copies would post the
/// same keys twice. Returns how many fields were removed.
pub fn retain_single_tracking_field<T>(
  fields: &mut Vec<T>,
  field_type: impl Fn(&T) -> &str,
) -> usize {
  let before = fields.len();
  let mut found = false;
  fields.retain(|field| {
    if field_type(field) != FIELD_TYPE {
      return true;
    }
    !std::mem::replace(&mut found, true)
  });

  let dropped = before - fields.len();
  if dropped > 0 {
    tracing::debug!(dropped, "removed duplicate tracking fields");
  }
  dropped
}

/// The inline statement publishing `config` to the page script.
///
/// `</` is written as `<\/` so no value can close the surrounding
/// `<script>` element.
pub fn config_script(config: &ClientConfig) -> Result<String> {
  let json = serde_json::to_string(config)?.replace("</", "<\\/");
  Ok(format!("var {CONFIG_GLOBAL} = {json};"))
}

// ─── Registration ────────────────────────────────────────────────────────────

/// Asset registration and config localization, performed at most once.
#[derive(Debug, Default)]
pub struct Registration {
  client: OnceLock<ClientConfig>,
}

impl Registration {
  pub const fn new() -> Self { Self { client: OnceLock::new() } }

  /// Register on first call and return the published client config. Later
  /// calls return the same config regardless of `settings`.
  pub fn ensure_initialized(&self, settings: &HostSettings) -> &ClientConfig {
    self.client.get_or_init(|| {
      let client = settings.client_config();
      tracing::info!(
        storage_key = %client.storage_key,
        ttl = client.ttl,
        keys = client.gumshoe_keys.len(),
        "registered attribution script"
      );
      client
    })
  }

  pub fn is_initialized(&self) -> bool { self.client.get().is_some() }

  pub fn client_config(&self) -> Option<&ClientConfig> { self.client.get() }
}

static REGISTRATION: Registration = Registration::new();

/// Process-wide [`Registration::ensure_initialized`].
pub fn ensure_initialized(settings: &HostSettings) -> &'static ClientConfig {
  REGISTRATION.ensure_initialized(settings)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_positive_ttl_falls_back_to_default() {
    let mut settings = HostSettings::default();
    settings.ttl_override = 0;
    assert_eq!(settings.ttl_seconds(), DEFAULT_TTL_SECONDS);
    settings.ttl_override = -10;
    assert_eq!(settings.ttl_seconds(), DEFAULT_TTL_SECONDS);
    settings.ttl_override = 86400;
    assert_eq!(settings.ttl_seconds(), 86400);
  }

  #[test]
  fn registration_is_idempotent() {
    let registration = Registration::new();
    assert!(!registration.is_initialized());

    let first = registration.ensure_initialized(&HostSettings::default()).clone();
    let other = HostSettings { storage_key: "other".into(), ..HostSettings::default() };
    let second = registration.ensure_initialized(&other);

    assert!(registration.is_initialized());
    assert_eq!(&first, second);
    assert_eq!(second.storage_key, DEFAULT_STORAGE_KEY);
  }

  #[test]
  fn global_guard_returns_one_config() {
    let a: *const ClientConfig = ensure_initialized(&HostSettings::default());
    let b: *const ClientConfig = ensure_initialized(&HostSettings::default());
    assert_eq!(a, b);
  }

  #[test]
  fn detects_tracking_field() {
    assert!(form_contains_tracking_field(["text", FIELD_TYPE]));
    assert!(!form_contains_tracking_field(["text", "email"]));
    assert!(!form_contains_tracking_field(std::iter::empty::<&str>()));
  }

  #[derive(Debug, PartialEq)]
  struct Field {
    id:   u32,
    kind: &'static str,
  }

  #[test]
  fn only_the_first_tracking_field_survives() {
    let field = |id, kind| Field { id, kind };
    let mut fields = vec![
      field(1, "text"),
      field(2, FIELD_TYPE),
      field(3, "email"),
      field(4, FIELD_TYPE),
      field(5, FIELD_TYPE),
    ];

    let dropped = retain_single_tracking_field(&mut fields, |f: &Field| f.kind);
    assert_eq!(dropped, 2);
    assert_eq!(fields.iter().map(|f| f.id).collect::<Vec<_>>(), [1, 2, 3]);

    let mut plain = vec![field(1, "text")];
    assert_eq!(retain_single_tracking_field(&mut plain, |f: &Field| f.kind), 0);
    assert_eq!(plain, [field(1, "text")]);
  }

  #[test]
  fn config_script_cannot_close_the_script_element() {
    let settings = HostSettings {
      storage_key: "</script><script>alert(1)//".into(),
      ..HostSettings::default()
    };
    let script = config_script(&settings.client_config()).unwrap();
    assert!(!script.contains("</"));
    assert!(script.contains(r#""storageKey":"<\/script><script>alert(1)//""#));
  }

  #[test]
  fn config_script_publishes_camel_case_json() {
    let script = config_script(&HostSettings::default().client_config()).unwrap();
    assert!(script.starts_with("var gumshoeConfig = {\"storageKey\":\"gfGumshoe\",\"ttl\":3600,"));
    assert!(script.ends_with("\"referrer\"]};"));
  }
}
