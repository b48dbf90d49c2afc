//! Error type for `gumshoe-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gumshoe_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("base64 decode error: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("payload is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),

  /// The write would take the storage area past its byte budget.
  #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
  QuotaExceeded { needed: usize, quota: usize },

  /// Storage is disabled or blocked for this page.
  #[error("storage unavailable")]
  Unavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
