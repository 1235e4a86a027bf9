// src/crawl/controller.rs
// =============================================================================
// The crawl loop.
//
// How it works:
// 1. Restore the visited set (and pending queue) from the checkpoint if it
//    was written for the same start URL, otherwise seed the start URL
// 2. Pop the next (url, depth) entry from the front of the queue
// 3. Skip it if it was already visited or lies past the depth budget
// 4. Wait a random politeness delay, mark the URL visited, fetch it
// 5. Save the text, queue every in-scope child link at depth + 1
// 6. Checkpoint every few pages, on a timer, on ctrl-c and at the end
//
// State machine:
//   Idle -> Running -> Completed | Interrupted
//   Idle -> Aborted   (output directory could not be prepared)
//
// The controller is the only owner of the frontier and the visited set.
// Per-page failures are logged and never stop the crawl.
//
// Rust concepts:
// - Generic struct Crawler<F: Fetch>: the fetcher is swapped for an in-memory site in tests
// - let-else: `let Some(entry) = self.frontier.pop() else { break; };`
// - tokio::select!: races the politeness sleep against ctrl-c
// - Instrument: attaches a tracing span to the whole crawl future
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Instant;
use tracing::{debug, info, info_span, trace, warn, Instrument};
use url::Url;

use super::{
    CrawlConfig, Frontier, FrontierEntry, Interrupt, Politeness, ScopeFilter, VisitedSet,
};
use crate::error::CrawlError;
use crate::fetch::{Fetch, PageResult};
use crate::store::{CheckpointStore, ContentWriter};

/// Lifecycle of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Running,
    /// Queue drained or page budget reached
    Completed,
    /// Stopped by the operator; resumable from the checkpoint
    Interrupted,
    /// Could not start; nothing was crawled
    Aborted,
}

/// Counters reported when a crawl finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub state: CrawlState,
    /// Pages fetched successfully in this run
    pub pages_fetched: usize,
    /// Fetch attempts that failed in this run
    pub pages_failed: usize,
    /// Text files written in this run
    pub pages_written: usize,
    /// Size of the visited set, including URLs restored from a checkpoint
    pub visited: usize,
    /// Entries left in the queue (duplicates included)
    pub pending: usize,
}

pub struct Crawler<F: Fetch> {
    /// Start URL exactly as given; the checkpoint key
    start_url: String,
    /// Parsed start URL; the first frontier entry and the scope base
    seed_url: String,
    output_dir: PathBuf,
    config: CrawlConfig,
    fetcher: F,
    scope: ScopeFilter,
    politeness: Politeness,
    checkpoints: CheckpointStore,
    writer: ContentWriter,
    interrupt: Interrupt,
    frontier: Frontier,
    visited: VisitedSet,
    state: CrawlState,
}

impl<F: Fetch> Crawler<F> {
    /// Prepares a crawl. Nothing touches the network or the disk yet.
    pub fn new(
        start_url: &str,
        output_dir: impl AsRef<Path>,
        config: CrawlConfig,
        fetcher: F,
    ) -> Result<Self, CrawlError> {
        let parsed = Url::parse(start_url).map_err(|source| CrawlError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CrawlError::Config(format!(
                "start URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let output_dir = output_dir.as_ref().to_path_buf();

        Ok(Self {
            start_url: start_url.to_string(),
            seed_url: parsed.to_string(),
            scope: ScopeFilter::new(config.scope.clone()),
            politeness: Politeness::new(config.budget.delay_range()),
            checkpoints: CheckpointStore::new(&output_dir),
            writer: ContentWriter::new(&output_dir),
            output_dir,
            config,
            fetcher,
            interrupt: Interrupt::new(),
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            state: CrawlState::Idle,
        })
    }

    /// Uses an externally owned stop flag (e.g. wired to ctrl-c).
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl to completion or interruption.
    ///
    /// Only startup failures are returned as errors; the state is then `Aborted`.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        if self.state != CrawlState::Idle {
            return Err(CrawlError::Config("crawl has already been run".to_string()));
        }

        if let Err(e) = self.prepare_directories() {
            self.state = CrawlState::Aborted;
            return Err(e);
        }

        self.restore();
        self.state = CrawlState::Running;

        let span = info_span!("crawl", start_url = %self.start_url);
        let report = self.crawl_loop().instrument(span).await;

        info!(
            state = ?report.state,
            fetched = report.pages_fetched,
            failed = report.pages_failed,
            visited = report.visited,
            "crawl finished"
        );
        Ok(report)
    }

    fn prepare_directories(&self) -> Result<(), CrawlError> {
        for dir in [self.output_dir.as_path(), self.checkpoints.dir()] {
            fs::create_dir_all(dir).map_err(|source| CrawlError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    // Loads visited URLs and pending work from a matching checkpoint
    fn restore(&mut self) {
        match self.checkpoints.load(&self.start_url) {
            Some(checkpoint) => {
                info!(
                    visited = checkpoint.visited_urls.len(),
                    pending = checkpoint.pending.len(),
                    "resuming from checkpoint"
                );
                self.visited = VisitedSet::restore(checkpoint.visited_urls);
                self.frontier = if checkpoint.pending.is_empty() {
                    Frontier::seeded(self.seed_url.clone())
                } else {
                    Frontier::restore(checkpoint.pending)
                };
            }
            None => {
                self.visited = VisitedSet::new();
                self.frontier = Frontier::seeded(self.seed_url.clone());
            }
        }
    }

    async fn crawl_loop(&mut self) -> CrawlReport {
        let max_depth = self.config.budget.max_depth();
        let max_pages = self.config.budget.max_pages();

        let mut pages_fetched = 0;
        let mut pages_failed = 0;
        let mut pages_written = 0;
        let mut since_checkpoint = 0;
        let mut last_checkpoint = Instant::now();

        loop {
            if self.interrupt.is_triggered() {
                self.state = CrawlState::Interrupted;
                break;
            }
            if self.visited.len() >= max_pages {
                info!(max_pages, "page budget reached");
                break;
            }

            let Some(entry) = self.frontier.pop() else {
                break;
            };
            if self.visited.contains(&entry.url) {
                continue;
            }
            if entry.depth > max_depth {
                trace!(url = %entry.url, depth = entry.depth, "beyond depth budget, dropped");
                continue;
            }

            if !self.polite_wait().await {
                // Stop requested during the delay: the entry was never fetched
                self.frontier.push_front(entry);
                self.state = CrawlState::Interrupted;
                break;
            }

            self.visited.insert(entry.url.clone());
            info!(depth = entry.depth, url = %entry.url, "crawling");

            match self.fetcher.fetch(&entry.url).await {
                Ok(page) => {
                    pages_fetched += 1;
                    if self.record_page(&entry, page) {
                        pages_written += 1;
                    }
                }
                Err(e) => {
                    pages_failed += 1;
                    warn!(url = %entry.url, "fetch failed, page skipped: {}", e);
                }
            }

            since_checkpoint += 1;
            if since_checkpoint >= self.config.checkpoint_every
                || last_checkpoint.elapsed() >= self.config.checkpoint_interval
            {
                self.save_checkpoint();
                since_checkpoint = 0;
                last_checkpoint = Instant::now();
            }

            debug!(
                visited = self.visited.len(),
                queued = self.frontier.len(),
                "progress"
            );
        }

        if self.state == CrawlState::Running {
            self.state = CrawlState::Completed;
        }
        self.save_checkpoint();

        CrawlReport {
            state: self.state,
            pages_fetched,
            pages_failed,
            pages_written,
            visited: self.visited.len(),
            pending: self.frontier.len(),
        }
    }

    // Sleeps for the politeness delay. Returns false if interrupted meanwhile.
    async fn polite_wait(&self) -> bool {
        let delay = self.politeness.next_delay();
        trace!(?delay, "politeness delay");
        tokio::select! {
            biased;
            _ = self.interrupt.triggered() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    // Writes the page text and queues its in-scope children.
    // Returns true if a text file was written.
    fn record_page(&mut self, entry: &FrontierEntry, page: PageResult) -> bool {
        let mut written = false;
        if !page.text.is_empty() {
            match self.writer.write(&entry.url, &page.text) {
                Ok(path) => {
                    debug!(path = %path.display(), "content saved");
                    written = true;
                }
                Err(e) => warn!(url = %entry.url, "could not save page content: {}", e),
            }
        }

        // Children deeper than the budget would only be drained later
        if entry.depth < self.config.budget.max_depth() {
            for link in page.links {
                if !self.visited.contains(&link) && self.scope.admit(&link, &self.seed_url) {
                    self.frontier.push(FrontierEntry::new(link, entry.depth + 1));
                }
            }
        }

        written
    }

    fn save_checkpoint(&self) {
        if let Err(e) = self.checkpoints.save(
            &self.start_url,
            self.visited.urls(),
            &self.frontier.snapshot(),
        ) {
            warn!("could not save checkpoint, continuing with in-memory state: {}", e);
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why mark a URL visited before fetching it?
//    - A page that fails is not tried again in this run
//    - The same URL can sit in the queue several times; only the first pop counts
//
// 2. Why is Crawler generic instead of holding an HttpFetcher?
//    - Fetch is a trait, so tests pass &ScriptedSite and never touch the network
//    - The compiler generates one copy of the loop per fetcher type (no dyn calls)
//
// 3. What does `biased;` do in select!?
//    - Branches are polled top to bottom instead of in random order
//    - So an interrupt that is already set always wins over a finished sleep
// -----------------------------------------------------------------------------
