//! Core types and pure functions for session attribution capture.
//!
//! This crate is deliberately free of storage backends and host-page
//! integrations. It defines the attribution record, the configuration the
//! host hands to the engine, the merge/derive rules, and the traits the
//! engine talks to (storage slot, clock, marked fields).

pub mod attribution;
pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod page;
pub mod populate;
pub mod record;
pub mod storage;

pub use error::{Error, Result};
pub use record::{AttributionRecord, Values};
