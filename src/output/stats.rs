//! Crawl statistics
//!
//! Statistics are collected live by a crawl session and can be rebuilt for
//! any stored run from the database.

use crate::state::PageState;
use crate::storage::{Storage, StorageResult};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of URLs with a recorded final state
    pub total_pages: u64,

    /// Number of pages that were actually requested
    pub pages_fetched: u64,

    /// Count of pages by state
    pub pages_by_state: HashMap<PageState, u64>,

    /// Page count by depth
    pub depth_breakdown: HashMap<u32, usize>,

    /// Number of unique domains encountered
    pub unique_domains: u64,

    /// Wall-clock duration of the crawl
    pub duration_seconds: Option<f64>,
}

impl CrawlStatistics {
    /// Records the final state of one URL
    pub fn record(&mut self, state: PageState, depth: u32) {
        self.total_pages += 1;
        if state != PageState::DepthExceeded {
            self.pages_fetched += 1;
        }
        *self.pages_by_state.entry(state).or_insert(0) += 1;
        *self.depth_breakdown.entry(depth).or_insert(0) += 1;
    }

    /// Number of pages that ended in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of pages that ended in an error state
    pub fn error_count(&self) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of fetched pages that were parsed successfully
    pub fn success_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        let successes: u64 = self
            .pages_by_state
            .iter()
            .filter(|(state, _)| state.is_success())
            .map(|(_, count)| count)
            .sum();
        successes as f64 / self.pages_fetched as f64 * 100.0
    }
}

/// Loads statistics for a stored run
pub fn load_statistics(storage: &dyn Storage, run_id: i64) -> StorageResult<CrawlStatistics> {
    let pages_by_state = storage.get_state_summary(run_id)?;
    let depth_breakdown = storage.get_depth_breakdown(run_id)?;

    let run = storage.get_run(run_id)?;
    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(str::parse::<chrono::DateTime<chrono::Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => {
            Some((finished - started).num_milliseconds() as f64 / 1000.0)
        }
        _ => None,
    };

    let pages_fetched = pages_by_state
        .iter()
        .filter(|(state, _)| **state != PageState::DepthExceeded)
        .map(|(_, count)| count)
        .sum();

    Ok(CrawlStatistics {
        total_pages: storage.count_run_pages(run_id)?,
        pages_fetched,
        pages_by_state,
        depth_breakdown,
        unique_domains: storage.count_unique_domains(run_id)?,
        duration_seconds,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.total_pages);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Accepted: {}", stats.count(PageState::Accepted));
    println!("  Unique domains: {}", stats.unique_domains);
    if let Some(duration) = stats.duration_seconds {
        println!("  Duration: {:.1}s", duration);
    }
    println!();

    println!("Pages by State:");
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.to_db_string().cmp(b.0.to_db_string())));

    for (state, count) in state_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.depth_breakdown.is_empty() {
        println!("Pages by Depth:");
        let mut depths: Vec<_> = stats.depth_breakdown.iter().collect();
        depths.sort_by_key(|(depth, _)| **depth);
        for (depth, count) in depths {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} errors)",
        stats.success_rate(),
        stats.error_count()
    );
}
