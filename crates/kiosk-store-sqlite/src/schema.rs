//! SQL schema for the visitor SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Visitors are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS visitors (
    visitor_id    TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    company       TEXT NOT NULL,
    email         TEXT NOT NULL,
    purpose       TEXT NOT NULL,
    phone         TEXT NOT NULL,
    date_of_birth TEXT,
    gender        TEXT,            -- display label, e.g. 'Prefer not to say'
    -- Normalised duplicate key (trimmed, collapsed, lowercased).
    name_key      TEXT NOT NULL,
    company_key   TEXT NOT NULL,
    email_key     TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC, fixed microsecond width
);

CREATE INDEX IF NOT EXISTS visitors_key_idx
    ON visitors(email_key, name_key, company_key, created_at);
CREATE INDEX IF NOT EXISTS visitors_created_idx ON visitors(created_at);

PRAGMA user_version = 1;
";
