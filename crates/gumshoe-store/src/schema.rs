//! SQL schema for the SQLite-backed storage slot.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per storage key, the equivalent of a local storage entry.
CREATE TABLE IF NOT EXISTS slots (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,   -- encoded payload, opaque to the database
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC of the last write
);

PRAGMA user_version = 1;
";
