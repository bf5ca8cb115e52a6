//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Recipe-Ripple database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    mode TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every URL the crawler touched, with the state it ended in
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    domain TEXT NOT NULL,
    depth INTEGER NOT NULL,
    state TEXT NOT NULL,
    title TEXT,
    status_code INTEGER,
    error_message TEXT,
    visited_at TEXT NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id)
);

CREATE INDEX IF NOT EXISTS idx_pages_domain ON pages(domain);
CREATE INDEX IF NOT EXISTS idx_pages_state ON pages(state);
CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);

-- Pages accepted by a run, with their relevance breakdown
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    score REAL NOT NULL,
    title_match REAL,
    ingredients_match REAL,
    content_match REAL,
    is_recipe INTEGER,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_matches_run ON matches(run_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
