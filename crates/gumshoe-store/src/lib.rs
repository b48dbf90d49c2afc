//! The attribution store engine and its storage backends.
//!
//! [`AttributionStore`] runs one load → capture → merge → derive → persist
//! cycle per page view against any [`SlotStorage`]. Two backends ship here:
//! an in-memory map and a SQLite table standing in for browser local storage.
//!
//! [`SlotStorage`]: gumshoe_core::storage::SlotStorage

mod encode;
mod memory;
mod schema;
mod session;
mod sqlite;
mod store;

pub mod error;

pub use encode::{
  DECODE_STRATEGIES, DecodeStrategy, decode_json, decode_opaque, decode_payload,
  encode_json, encode_opaque, encode_payload,
};
pub use error::{Error, Result};
pub use memory::MemoryStorage;
pub use session::{PageSession, ReadyState};
pub use sqlite::SqliteStorage;
pub use store::{AttributionStore, RunOutcome};
