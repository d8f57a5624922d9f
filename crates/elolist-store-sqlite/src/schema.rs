//! SQL schema for the elolist SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Name of the derived age-group table.
pub const AGE_GROUP_VIEW: &str = "monthlyupdate_open_players_with_age_group_mv";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data, loaded by the operator; never written by ingestion.
CREATE TABLE IF NOT EXISTS countries (
    code      TEXT PRIMARY KEY,
    country   TEXT NOT NULL,
    subregion TEXT NOT NULL,
    continent TEXT NOT NULL
);

-- One row per person, written on first sighting and never updated.
CREATE TABLE IF NOT EXISTS players (
    id    INTEGER PRIMARY KEY,
    name  TEXT    NOT NULL,
    sex   TEXT    NOT NULL,
    b_day INTEGER NOT NULL
);

-- Strictly append-only; one row per player per rating period.
CREATE TABLE IF NOT EXISTS monthlyupdates (
    id              INTEGER NOT NULL REFERENCES players(id),
    fed             TEXT    NOT NULL,
    title           TEXT    NOT NULL,   -- 'GM' | ... | 'NT'
    number_of_games INTEGER NOT NULL,
    activity_status TEXT    NOT NULL,   -- 'a' | 'i'
    rating          INTEGER NOT NULL,
    ongoing_date    TEXT    NOT NULL,   -- YYYY-MM-01
    PRIMARY KEY (id, ongoing_date)
);

-- Derived from monthlyupdates JOIN players; rebuilt in full by
-- refresh_age_groups, never maintained incrementally.
CREATE TABLE IF NOT EXISTS monthlyupdate_open_players_with_age_group_mv (
    id              INTEGER NOT NULL,
    name            TEXT    NOT NULL,
    sex             TEXT    NOT NULL,
    b_day           INTEGER NOT NULL,
    fed             TEXT    NOT NULL,
    title           TEXT    NOT NULL,
    number_of_games INTEGER NOT NULL,
    activity_status TEXT    NOT NULL,
    rating          INTEGER NOT NULL,
    ongoing_date    TEXT    NOT NULL,
    age             INTEGER NOT NULL,
    age_category    TEXT    NOT NULL,
    PRIMARY KEY (id, ongoing_date)
);

CREATE INDEX IF NOT EXISTS monthlyupdates_date_idx ON monthlyupdates(ongoing_date);
CREATE INDEX IF NOT EXISTS monthlyupdates_fed_idx  ON monthlyupdates(fed);

PRAGMA user_version = 1;
";

/// Full recomputation of the age-group table. Run inside one transaction so
/// readers never observe it half-built.
pub const REFRESH_AGE_GROUPS: &str = "
DELETE FROM monthlyupdate_open_players_with_age_group_mv;

INSERT INTO monthlyupdate_open_players_with_age_group_mv (
    id, name, sex, b_day, fed, title, number_of_games,
    activity_status, rating, ongoing_date, age, age_category
)
SELECT
    id, name, sex, b_day, fed, title, number_of_games,
    activity_status, rating, ongoing_date, age,
    CASE
        WHEN age < 19  THEN 'Less than 19'
        WHEN age <= 30 THEN '19-30'
        WHEN age <= 40 THEN '31-40'
        WHEN age <= 50 THEN '41-50'
        WHEN age <= 65 THEN '51-65'
        ELSE 'More than 66'
    END
FROM (
    SELECT
        m.id, p.name, p.sex, p.b_day, m.fed, m.title, m.number_of_games,
        m.activity_status, m.rating, m.ongoing_date,
        CAST(strftime('%Y', m.ongoing_date) AS INTEGER) - p.b_day AS age
    FROM monthlyupdates m
    JOIN players p ON p.id = m.id
);
";
