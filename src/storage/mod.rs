//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Run tracking (one row per crawl, keyed by config hash)
//! - Per-URL page states, used to pre-populate incremental crawls
//! - Accepted matches with their score breakdown

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::PageState;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub domain: String,
    pub depth: u32,
    pub state: PageState,
    pub title: Option<String>,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub visited_at: String,
    pub run_id: i64,
}

/// What the crawler learned about one URL, ready to be persisted
#[derive(Debug, Clone)]
pub struct PageVisit<'a> {
    pub url: &'a str,
    pub domain: &'a str,
    pub depth: u32,
    pub state: PageState,
    pub title: Option<&'a str>,
    pub status_code: Option<u16>,
    pub error_message: Option<&'a str>,
}

/// An accepted page as stored in the `matches` table
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub url: String,
    pub score: f64,
    pub title_match: Option<f64>,
    pub ingredients_match: Option<f64>,
    pub content_match: Option<f64>,
    pub is_recipe: Option<bool>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub mode: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
