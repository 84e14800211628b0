//! SQL schema for the Observer SQLite store.
//!
//! Applied at connection startup. `PRAGMA user_version` records the schema
//! version; future migrations will be gated on that number.

/// Version written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Transition records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS status_log (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
    user_id   INTEGER NOT NULL,
    guild_id  INTEGER NOT NULL,
    before    TEXT CHECK (before IN ('online', 'idle', 'dnd', 'offline')),
    after     TEXT CHECK (after  IN ('online', 'idle', 'dnd', 'offline')),
    time      TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    CHECK (before IS NOT NULL OR after IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS status_log_scope_idx
    ON status_log(user_id, guild_id, time, seq);

PRAGMA user_version = 1;
";
