//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Records are written once and never updated; rows are only ever deleted.
-- subject_id is NOT unique.
CREATE TABLE IF NOT EXISTS records (
    record_id     TEXT PRIMARY KEY,
    subject_name  TEXT NOT NULL,
    subject_id    TEXT NOT NULL,
    artifact_key  TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS records_subject_idx ON records(subject_id);

PRAGMA user_version = 1;
";
