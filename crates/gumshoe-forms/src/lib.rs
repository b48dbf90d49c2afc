//! Host form integration for the attribution field.
//!
//! The host renders one hidden input per tracking key, stores one value per
//! key when the form is submitted, and later shows the stored pairs in entry
//! views. Everything here is pure string work over [`gumshoe_core`] types;
//! reading entries from the host's records system goes through the narrow
//! [`EntryLookup`] trait.

pub mod display;
pub mod error;
pub mod host;
pub mod layout;
pub mod value;

pub use display::{DisplayFormat, EntryLookup, EntryRef};
pub use error::{Error, Result};
pub use host::{HostSettings, Registration, ensure_initialized, retain_single_tracking_field};
pub use layout::{FieldLayout, InputSpec};
pub use value::{EntryValues, FieldValue};
