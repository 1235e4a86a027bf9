// src/crawl/mod.rs
// =============================================================================
// This module holds the crawl engine.
//
// Features:
// - Breadth-first crawling from a start URL, bounded by depth and page count
// - Scope filter keeping the crawl inside one site and one path prefix
// - Randomized politeness delay before every request
// - Visited-set deduplication, persisted in checkpoints for resuming
// - Clean stop on ctrl-c with a final checkpoint
//
// Submodules, leaf first:
// - scope, frontier, visited, politeness, interrupt: small building blocks
// - budget: limits and tunables
// - controller: the loop that ties everything together
// =============================================================================

mod budget;
mod controller;
mod frontier;
mod interrupt;
mod politeness;
mod scope;
mod visited;

pub use budget::{CrawlBudget, CrawlConfig};
pub use controller::{CrawlReport, CrawlState, Crawler};
pub use frontier::{Frontier, FrontierEntry};
pub use interrupt::Interrupt;
pub use politeness::Politeness;
pub use scope::{ScopeFilter, ScopePolicy};
pub use visited::VisitedSet;
