// src/crawl/visited.rs
// =============================================================================
// URLs that have already been dispatched for fetching.
//
// A URL goes in right before its request is sent, whether or not the request
// later succeeds, so a failed page is not retried during the same run.
// The set only ever grows. Insertion order is kept so a checkpoint lists
// pages in the order they were crawled.
//
// Rust concepts:
// - HashSet for O(1) lookups plus a Vec that remembers insertion order
// - Returning &[String] lends the order out without cloning it
// =============================================================================

use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    lookup: HashSet<String>,
    order: Vec<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the set from checkpointed URLs. Repeated URLs are kept once.
    pub fn restore<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut visited = Self::new();
        for url in urls {
            visited.insert(url);
        }
        visited
    }

    /// Records a URL. Returns false if it was already present.
    pub fn insert(&mut self, url: String) -> bool {
        if self.lookup.contains(&url) {
            return false;
        }
        self.lookup.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lookup.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// URLs in the order they were first recorded.
    pub fn urls(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert("https://example.com/a".to_string()));
        assert!(!visited.insert("https://example.com/a".to_string()));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut visited = VisitedSet::new();
        visited.insert("b".to_string());
        visited.insert("a".to_string());
        assert_eq!(visited.urls(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_restore_drops_repeats() {
        let visited = VisitedSet::restore(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(visited.len(), 2);
        assert!(visited.contains("a"));
        assert!(visited.contains("b"));
    }

    #[test]
    fn test_raw_string_comparison() {
        // No normalization: trailing slash and fragment make distinct entries
        let mut visited = VisitedSet::new();
        visited.insert("https://example.com/a".to_string());
        assert!(!visited.contains("https://example.com/a/"));
        assert!(!visited.contains("https://example.com/a#top"));
    }
}
