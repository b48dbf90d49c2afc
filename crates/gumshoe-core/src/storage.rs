//! The persistence slot abstraction.
//!
//! Mirrors a browser's local storage: a flat string → string map where reads
//! and writes may fail (storage disabled, quota exceeded). Backends live in
//! `gumshoe-store`; the engine depends only on this trait.

/// A string-keyed, string-valued local storage area.
pub trait SlotStorage {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`, `None` if nothing is stored.
  fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Store `value` under `key`, replacing any previous value.
  fn set_item(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

  /// Erase `key`. Erasing a missing key is not an error.
  fn remove_item(&mut self, key: &str) -> Result<(), Self::Error>;
}

impl<S: SlotStorage + ?Sized> SlotStorage for &mut S {
  type Error = S::Error;

  fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
    (**self).get_item(key)
  }

  fn set_item(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
    (**self).set_item(key, value)
  }

  fn remove_item(&mut self, key: &str) -> Result<(), Self::Error> {
    (**self).remove_item(key)
  }
}
