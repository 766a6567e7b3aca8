//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Users are upserted keyed by email; the same external identity always
-- resolves to the same user_id.
CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,  -- stored lowercased
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    supervisor_id TEXT REFERENCES users(user_id),
    entry_date    TEXT,                  -- ISO 8601 date
    exit_date     TEXT,
    profile_json  TEXT NOT NULL DEFAULT '{}',
    created_at    TEXT NOT NULL,         -- ISO 8601 UTC
    updated_at    TEXT NOT NULL
);

-- Unit identity is structural: (name, parent). Units are never deleted by
-- the import pipeline.
CREATE TABLE IF NOT EXISTS org_units (
    unit_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    parent_id  TEXT REFERENCES org_units(unit_id),
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS org_units_identity_idx
    ON org_units(name, ifnull(parent_id, ''));

-- Memberships are re-asserted on every import; deactivation is downstream.
-- sync_excluded rows are operator-curated and never touched by imports.
CREATE TABLE IF NOT EXISTS memberships (
    membership_id    TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES users(user_id),
    unit_id          TEXT NOT NULL REFERENCES org_units(unit_id),
    active           INTEGER NOT NULL DEFAULT 1,
    sync_excluded    INTEGER NOT NULL DEFAULT 0,
    last_imported_at TEXT NOT NULL,
    UNIQUE (user_id, unit_id)
);

CREATE INDEX IF NOT EXISTS org_units_parent_idx  ON org_units(parent_id);
CREATE INDEX IF NOT EXISTS memberships_unit_idx  ON memberships(unit_id);
CREATE INDEX IF NOT EXISTS users_supervisor_idx  ON users(supervisor_id);

PRAGMA user_version = 1;
";
