//! Breadth-first crawl frontier
//!
//! A FIFO queue of `(url, depth)` entries, the set of URLs that were ever
//! enqueued or fetched, and the subset that was fetched. A URL enters the
//! queue at most once per session and is processed at most once.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// FIFO frontier with seen and fetched sets
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
    fetched: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier whose seen set is pre-populated
    ///
    /// Used for incremental crawls: URLs visited by earlier runs are never
    /// enqueued again and count as fetched.
    pub fn with_visited(visited: HashSet<String>) -> Self {
        Self {
            queue: VecDeque::new(),
            fetched: visited.clone(),
            seen: visited,
        }
    }

    /// Enqueues a seed regardless of the seen set
    ///
    /// Seeds are re-fetched on every run so their links get re-examined.
    /// Returns false if the seed is already waiting in the queue.
    pub fn push_seed(&mut self, url: Url) -> bool {
        if self.queue.iter().any(|entry| entry.url == url) {
            return false;
        }
        self.seen.insert(url.as_str().to_string());
        self.queue.push_back(FrontierEntry { url, depth: 0 });
        true
    }

    /// Enqueues `url` at `depth` unless it was seen before
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Claims a URL for processing
    ///
    /// Marks it seen and fetched and drops any entry still waiting for it, so
    /// a redirect target that was queued is not fetched a second time.
    /// Returns false if the URL was already fetched.
    pub fn claim(&mut self, url: &Url) -> bool {
        if !self.fetched.insert(url.as_str().to_string()) {
            return false;
        }
        self.seen.insert(url.as_str().to_string());
        self.queue.retain(|entry| entry.url != *url);
        true
    }

    /// Marks a URL as seen without queueing it
    ///
    /// Returns true if the URL was not seen before.
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        self.seen.insert(url.as_str().to_string())
    }

    /// Returns true if the URL was enqueued, fetched or marked before
    pub fn has_seen(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Number of entries waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
