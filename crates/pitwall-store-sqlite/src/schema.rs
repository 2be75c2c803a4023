//! SQL schema for the Pitwall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS race_plans (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id   INTEGER NOT NULL,
    event_id  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS roster_entries (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    race_plan_id INTEGER NOT NULL REFERENCES race_plans(id) ON DELETE CASCADE,
    user_id      INTEGER,          -- NULL for placeholder drivers
    name         TEXT NOT NULL,
    color        TEXT,
    preference   TEXT,
    stints       INTEGER,
    fair_share   INTEGER,
    gmt_offset   INTEGER,
    i_rating     REAL,
    lap_time     REAL,
    factor       INTEGER
);

-- At most one entry per driver per plan. Placeholder entries are exempt:
-- SQLite treats NULLs as distinct in unique indexes.
CREATE UNIQUE INDEX IF NOT EXISTS roster_plan_user_idx
    ON roster_entries(race_plan_id, user_id);

CREATE INDEX IF NOT EXISTS roster_plan_idx ON roster_entries(race_plan_id);

CREATE TABLE IF NOT EXISTS registrations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id      INTEGER NOT NULL,
    user_id       INTEGER NOT NULL,
    team_id       INTEGER NOT NULL,
    time_slot     TEXT NOT NULL,   -- RFC 3339 UTC
    car_id        INTEGER NOT NULL,
    registered_at TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    UNIQUE (event_id, user_id, team_id)
);

CREATE INDEX IF NOT EXISTS registrations_event_team_idx
    ON registrations(event_id, team_id);

-- Display-name cache, kept warm by the profile sync layer.
CREATE TABLE IF NOT EXISTS users (
    user_id      INTEGER PRIMARY KEY,
    display_name TEXT NOT NULL
);

PRAGMA user_version = 1;
";
