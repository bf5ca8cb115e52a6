//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::PageState;
use crate::storage::{MatchRecord, PageRecord, PageVisit, RunRecord, RunStatus};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("No crawl runs recorded yet")]
    NoRuns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler and the
/// `stats` command.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `mode` - Gate mode the run uses
    fn create_run(&mut self, config_hash: &str, mode: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as finished with the given status and a finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Page Management =====

    /// Records the final state of a URL for a run
    ///
    /// A URL seen by an earlier run is overwritten with the newer visit.
    fn record_page(&mut self, run_id: i64, visit: &PageVisit<'_>) -> StorageResult<()>;

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Loads every URL that a previous run fetched or tried to fetch
    ///
    /// Depth-exceeded links were never requested and are not included.
    fn load_visited_urls(&self) -> StorageResult<HashSet<String>>;

    // ===== Matches =====

    /// Records an accepted page for a run
    fn record_match(&mut self, run_id: i64, record: &MatchRecord) -> StorageResult<()>;

    /// Gets the best matches of a run, highest score first
    fn get_top_matches(&self, run_id: i64, limit: usize) -> StorageResult<Vec<MatchRecord>>;

    // ===== Statistics =====

    /// Counts pages recorded by a run
    fn count_run_pages(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts pages of a run by final state
    fn get_state_summary(&self, run_id: i64) -> StorageResult<HashMap<PageState, u64>>;

    /// Gets page count breakdown by depth for a run
    fn get_depth_breakdown(&self, run_id: i64) -> StorageResult<HashMap<u32, usize>>;

    /// Gets count of unique domains a run touched
    fn count_unique_domains(&self, run_id: i64) -> StorageResult<u64>;
}
