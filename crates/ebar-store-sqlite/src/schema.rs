//! SQL schema for the EBar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per (event, unit). Append-only: rows are never updated or deleted.
-- Insertion order is recovered through the implicit rowid.
CREATE TABLE IF NOT EXISTS events (
    event_id        TEXT PRIMARY KEY,
    event_name      TEXT NOT NULL,
    venue           TEXT NOT NULL,
    location        TEXT NOT NULL,
    delivery_date   TEXT NOT NULL,   -- YYYY-MM-DD
    event_date      TEXT NOT NULL,   -- YYYY-MM-DD
    collection_date TEXT,            -- YYYY-MM-DD or NULL
    assigned_ebar   TEXT NOT NULL    -- EBAR001 .. EBARnnn
);

CREATE INDEX IF NOT EXISTS events_unit_idx ON events(assigned_ebar);
CREATE INDEX IF NOT EXISTS events_date_idx ON events(event_date);

PRAGMA user_version = 1;
";
