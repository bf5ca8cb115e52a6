//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::PageState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{MatchRecord, PageRecord, PageVisit, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const PAGE_COLUMNS: &str =
    "id, url, domain, depth, state, title, status_code, error_message, visited_at, run_id";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, mode, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        domain: row.get(2)?,
        depth: row.get(3)?,
        state: PageState::from_db_string(&row.get::<_, String>(4)?).unwrap_or(PageState::Failed),
        title: row.get(5)?,
        status_code: row.get(6)?,
        error_message: row.get(7)?,
        visited_at: row.get(8)?,
        run_id: row.get(9)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        mode: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, mode: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, mode, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, mode, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Page Management =====

    fn record_page(&mut self, run_id: i64, visit: &PageVisit<'_>) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (url, domain, depth, state, title, status_code, error_message, visited_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(url) DO UPDATE SET
                domain = excluded.domain,
                depth = excluded.depth,
                state = excluded.state,
                title = excluded.title,
                status_code = excluded.status_code,
                error_message = excluded.error_message,
                visited_at = excluded.visited_at,
                run_id = excluded.run_id",
            params![
                visit.url,
                visit.domain,
                visit.depth,
                visit.state.to_db_string(),
                visit.title,
                visit.status_code,
                visit.error_message,
                now,
                run_id
            ],
        )?;
        Ok(())
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE url = ?1", PAGE_COLUMNS),
                params![url],
                page_from_row,
            )
            .optional()?;

        Ok(page)
    }

    fn load_visited_urls(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT url, state FROM pages")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Never-fetched links and transient failures stay eligible
        let urls = rows
            .into_iter()
            .filter(|(_, state)| {
                PageState::from_db_string(state).map_or(false, |state| {
                    state != PageState::DepthExceeded && !state.is_transient()
                })
            })
            .map(|(url, _)| url)
            .collect();

        Ok(urls)
    }

    // ===== Matches =====

    fn record_match(&mut self, run_id: i64, record: &MatchRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO matches
             (run_id, url, score, title_match, ingredients_match, content_match, is_recipe)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                record.url,
                record.score,
                record.title_match,
                record.ingredients_match,
                record.content_match,
                record.is_recipe
            ],
        )?;
        Ok(())
    }

    fn get_top_matches(&self, run_id: i64, limit: usize) -> StorageResult<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, score, title_match, ingredients_match, content_match, is_recipe
             FROM matches WHERE run_id = ?1 ORDER BY score DESC, id ASC LIMIT ?2",
        )?;

        let matches = stmt
            .query_map(params![run_id, limit as i64], |row| {
                Ok(MatchRecord {
                    url: row.get(0)?,
                    score: row.get(1)?,
                    title_match: row.get(2)?,
                    ingredients_match: row.get(3)?,
                    content_match: row.get(4)?,
                    is_recipe: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    // ===== Statistics =====

    fn count_run_pages(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_state_summary(&self, run_id: i64) -> StorageResult<HashMap<PageState, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM pages WHERE run_id = ?1 GROUP BY state")?;

        let mut summary = HashMap::new();
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (state, count) = row?;
            if let Some(state) = PageState::from_db_string(&state) {
                summary.insert(state, count as u64);
            }
        }

        Ok(summary)
    }

    fn get_depth_breakdown(&self, run_id: i64) -> StorageResult<HashMap<u32, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT depth, COUNT(*) FROM pages WHERE run_id = ?1 GROUP BY depth")?;

        let breakdown = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(breakdown)
    }

    fn count_unique_domains(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT domain) FROM pages WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
