//! Error types for `gumshoe-forms`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
