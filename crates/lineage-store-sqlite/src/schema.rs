//! SQL schema for the Lineage SQLite store.
//!
//! Relationship tables deliberately carry no foreign keys: the cascade on
//! person deletion is done by the person manager, and readers skip rows that
//! name missing people.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS persons (
    id              INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    forename        TEXT    NOT NULL,
    surname         TEXT    NOT NULL,
    gender_id       INTEGER NOT NULL,   -- 0 = male, 1 = female
    date_of_birth   TEXT    NOT NULL,   -- ISO 8601 date
    place_of_birth  TEXT,
    date_of_death   TEXT,
    place_of_death  TEXT
);

-- The pair (person1_id, person2_id) is unordered; the unique index makes
-- (a, b) and (b, a) collide.
CREATE TABLE IF NOT EXISTS marriages (
    person1_id        INTEGER NOT NULL,
    person2_id        INTEGER NOT NULL,
    start_date        TEXT    NOT NULL,
    end_date          TEXT,
    place_of_marriage TEXT,
    CHECK (person1_id != person2_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS marriages_pair_idx
    ON marriages (min(person1_id, person2_id), max(person1_id, person2_id));

CREATE TABLE IF NOT EXISTS children (
    parent_id INTEGER NOT NULL,
    child_id  INTEGER NOT NULL,
    UNIQUE (parent_id, child_id),
    CHECK  (parent_id != child_id)
);

CREATE INDEX IF NOT EXISTS children_child_idx ON children(child_id);

PRAGMA user_version = 1;
";
