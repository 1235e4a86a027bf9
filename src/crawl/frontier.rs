// src/crawl/frontier.rs
// =============================================================================
// The breadth-first work queue.
//
// Each entry is a (url, depth) pair. Entries are appended at the back and
// consumed from the front, so every page at depth N is processed before any
// page at depth N + 1.
//
// The frontier does NOT deduplicate. Two parent pages linking to the same
// child both enqueue it; the visited set throws the second copy away when it
// is dequeued. As a consequence `len()` over-counts the remaining work.
//
// Rust concepts:
// - VecDeque: push_back/pop_front give FIFO order, push_front puts work back
// - serde derive: FrontierEntry is written into the checkpoint as JSON
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A page waiting to be crawled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub url: String,
    /// Link hops from the start URL (start URL = 0)
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// FIFO queue of frontier entries.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a crawl from a single URL at depth 0.
    pub fn seeded(start_url: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push(FrontierEntry::new(start_url, 0));
        frontier
    }

    /// Rebuilds a frontier from entries saved in a checkpoint, keeping their order.
    pub fn restore(entries: Vec<FrontierEntry>) -> Self {
        Self {
            queue: entries.into(),
        }
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    /// Puts an entry back at the head, used when a crawl stops before fetching it.
    pub fn push_front(&mut self, entry: FrontierEntry) {
        self.queue.push_front(entry);
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Number of queued entries, duplicates included.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Copies the queue out in crawl order, for checkpointing.
    pub fn snapshot(&self) -> Vec<FrontierEntry> {
        self.queue.iter().cloned().collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why doesn't the frontier remove duplicates?
//    - The controller checks the visited set when it pops an entry
//    - Keeping the queue dumb means the checkpoint stores it exactly as it was
// -----------------------------------------------------------------------------
