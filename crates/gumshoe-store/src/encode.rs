//! Encoding and decoding between [`AttributionRecord`] and the string held in
//! a storage slot.
//!
//! The preferred payload is the record's JSON, UTF-8 encoded and then
//! base64'd (standard alphabet, padded) so it is opaque to casual inspection.
//! Plain JSON is both the write fallback and the read fallback, which also
//! covers slots written by older encoders.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use gumshoe_core::AttributionRecord;

use crate::Result;

// ─── Encode ──────────────────────────────────────────────────────────────────

pub fn encode_json(record: &AttributionRecord) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

/// JSON text → UTF-8 bytes → base64.
pub fn encode_opaque(record: &AttributionRecord) -> Result<String> {
  let json = encode_json(record)?;
  Ok(STANDARD.encode(json.into_bytes()))
}

/// The payload to store: opaque if possible, plain JSON otherwise, `None`
/// only if the record cannot be serialised at all.
pub fn encode_payload(record: &AttributionRecord) -> Option<String> {
  match encode_opaque(record) {
    Ok(payload) => Some(payload),
    Err(e) => {
      tracing::debug!(error = %e, "opaque encoding failed; storing plain JSON");
      encode_json(record).ok()
    }
  }
}

// ─── Decode ──────────────────────────────────────────────────────────────────

/// One independently fallible way of reading a payload.
pub type DecodeStrategy = fn(&str) -> Result<AttributionRecord>;

/// Decoders tried in order; the first success wins.
pub const DECODE_STRATEGIES: [(&str, DecodeStrategy); 2] =
  [("opaque", decode_opaque), ("json", decode_json)];

/// base64 → UTF-8 → JSON; the inverse of [`encode_opaque`].
pub fn decode_opaque(raw: &str) -> Result<AttributionRecord> {
  let bytes = STANDARD.decode(raw.trim())?;
  let json = String::from_utf8(bytes)?;
  decode_json(&json)
}

pub fn decode_json(raw: &str) -> Result<AttributionRecord> {
  Ok(serde_json::from_str(raw)?)
}

/// Decode a stored payload, trying each of [`DECODE_STRATEGIES`]. Empty or
/// undecodable payloads yield `None`.
pub fn decode_payload(raw: &str) -> Option<AttributionRecord> {
  if raw.is_empty() {
    return None;
  }
  first_success(&DECODE_STRATEGIES, raw)
}

fn first_success<T>(
  strategies: &[(&str, fn(&str) -> Result<T>)],
  input: &str,
) -> Option<T> {
  for (name, strategy) in strategies {
    match strategy(input) {
      Ok(value) => return Some(value),
      Err(e) => tracing::debug!(strategy = *name, error = %e, "decode strategy failed"),
    }
  }
  None
}
