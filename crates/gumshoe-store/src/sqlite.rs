//! A [`SlotStorage`] persisted in a SQLite file.
//!
//! Lets a command-line session keep its attribution record between
//! invocations the way a browser keeps local storage between page loads.

use std::path::Path;

use chrono::Utc;
use gumshoe_core::storage::SlotStorage;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{Result, schema::SCHEMA};

pub struct SqliteStorage {
  conn: Connection,
}

impl SqliteStorage {
  /// Open (or create) the database at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::init(conn)
  }

  /// Open an in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn })
  }

  /// Every stored key, sorted.
  pub fn keys(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key")?;
    let keys = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
  }
}

impl SlotStorage for SqliteStorage {
  type Error = crate::Error;

  fn get_item(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .conn
      .query_row(
        "SELECT value FROM slots WHERE key = ?1",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
    self.conn.execute(
      "INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         value = excluded.value,
         updated_at = excluded.updated_at",
      params![key, value, Utc::now().to_rfc3339()],
    )?;
    Ok(())
  }

  fn remove_item(&mut self, key: &str) -> Result<()> {
    self
      .conn
      .execute("DELETE FROM slots WHERE key = ?1", params![key])?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn upserts_and_deletes() {
    let mut s = SqliteStorage::open_in_memory().unwrap();
    assert_eq!(s.get_item("gfGumshoe").unwrap(), None);

    s.set_item("gfGumshoe", "one").unwrap();
    s.set_item("gfGumshoe", "two").unwrap();
    s.set_item("other", "x").unwrap();
    assert_eq!(s.get_item("gfGumshoe").unwrap().as_deref(), Some("two"));
    assert_eq!(s.keys().unwrap(), ["gfGumshoe", "other"]);

    s.remove_item("gfGumshoe").unwrap();
    assert_eq!(s.get_item("gfGumshoe").unwrap(), None);
    assert_eq!(s.keys().unwrap(), ["other"]);
  }
}
