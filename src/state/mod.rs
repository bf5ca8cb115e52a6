//! State module for tracking crawl progress
//!
//! `PageState` records what happened to every URL the crawler touched. The
//! string form is what gets persisted in the `pages` table.

mod page_state;

pub use page_state::PageState;
