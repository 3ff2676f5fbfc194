//! SQL schema for the resident SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `status` deliberately has no CHECK constraint: codes are validated when a
/// row is decoded, so a bad code surfaces as an error instead of being
/// silently mapped.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS residents (
    resident_id      TEXT PRIMARY KEY,
    account_id       TEXT NOT NULL UNIQUE,
    first_name       TEXT NOT NULL,
    middle_name      TEXT,
    last_name        TEXT NOT NULL,
    gender           TEXT NOT NULL DEFAULT '',
    birth_date       TEXT,             -- YYYY-MM-DD
    address          TEXT NOT NULL,    -- JSON Address
    contact          TEXT NOT NULL,    -- JSON Contact
    spouse           TEXT,             -- JSON Spouse or NULL
    household        TEXT NOT NULL DEFAULT '[]',
    census           TEXT NOT NULL,    -- JSON Census
    profile_image    TEXT,             -- storage path
    valid_id         TEXT,             -- storage path
    zone_certificate TEXT,             -- storage path
    latitude         REAL,
    longitude        REAL,
    status           INTEGER NOT NULL, -- 1..=6, see ResidentStatus::code
    rejection_reason TEXT,
    created_at       TEXT NOT NULL,    -- RFC 3339 UTC, fixed width
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS residents_status_idx  ON residents(status);
CREATE INDEX IF NOT EXISTS residents_created_idx ON residents(created_at);

PRAGMA user_version = 1;
";
