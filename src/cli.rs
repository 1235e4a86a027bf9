// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the struct below IS the CLI. Each field becomes an
// argument, doc comments become the --help text, and default values are
// declared right next to the field they belong to.
//
// Example:
//   doc-snapshot https://wiki.example.com/display/Proj --depth 3 --max-pages 200
// =============================================================================

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::crawl::{CrawlBudget, CrawlConfig, ScopePolicy};
use crate::error::CrawlError;
use crate::fetch::{HttpOptions, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "doc-snapshot",
    version,
    about = "Snapshot a documentation site or wiki into plain text files",
    long_about = "doc-snapshot crawls a site breadth-first from a start URL, stays below the \
                  start URL's directory, and writes the text of every page to its own file. \
                  Progress is checkpointed, so an interrupted crawl resumes where it stopped \
                  when run again with the same start URL."
)]
pub struct Cli {
    /// URL to start crawling from (also the key of the saved progress)
    pub url: String,

    /// Maximum crawl depth (0 = only the start page)
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    /// Maximum number of pages to crawl, including pages from earlier runs
    #[arg(long, default_value_t = 50)]
    pub max_pages: usize,

    /// Directory for page text, progress and stored credentials
    #[arg(long, default_value = "scraped_content")]
    pub output_dir: PathBuf,

    /// Username for HTTP basic authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(long)]
    pub password: Option<String>,

    /// Minimum delay before each request, in seconds
    #[arg(long, default_value_t = 1.0)]
    pub min_delay: f64,

    /// Maximum delay before each request, in seconds
    #[arg(long, default_value_t = 3.0)]
    pub max_delay: f64,

    /// Store the credentials (encrypted) in the output directory for later runs
    #[arg(long)]
    pub save_credentials: bool,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Accept invalid TLS certificates (self-signed intranet wikis)
    #[arg(long)]
    pub insecure: bool,

    /// Only follow links inside a documentation space (/display/, /spaces/, /wiki/, /docs/)
    #[arg(long)]
    pub space_only: bool,

    /// Also follow links to PDFs, archives and office documents
    #[arg(long)]
    pub include_binary: bool,

    /// Save progress after this many pages
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Never prompt for credentials; crawl anonymously if none are available
    #[arg(long)]
    pub no_prompt: bool,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the crawl configuration, validating the numeric arguments.
    pub fn crawl_config(&self) -> Result<CrawlConfig, CrawlError> {
        if self.checkpoint_every == 0 {
            return Err(CrawlError::Config(
                "--checkpoint-every must be at least 1".to_string(),
            ));
        }

        Ok(CrawlConfig {
            budget: CrawlBudget::new(self.depth, self.max_pages, self.min_delay, self.max_delay)?,
            scope: ScopePolicy {
                skip_binary_extensions: !self.include_binary,
                require_space_marker: self.space_only,
            },
            checkpoint_every: self.checkpoint_every,
            ..CrawlConfig::default()
        })
    }

    /// Transport settings; credentials are resolved separately.
    pub fn http_options(&self, credentials: Option<(String, String)>) -> Result<HttpOptions, CrawlError> {
        if self.timeout == 0 {
            return Err(CrawlError::Config("--timeout must be at least 1 second".to_string()));
        }

        Ok(HttpOptions {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            credentials,
            accept_invalid_certs: self.insecure,
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. default_value_t vs default_value
//    - default_value_t takes a typed Rust value (2, 1.0, ...)
//    - default_value takes a string that clap parses like user input
//    - PathBuf and String defaults are easiest to give as strings
//
// 2. Why Option<String> for username/password?
//    - None means "not given on the command line"
//    - main.rs then falls back to stored credentials or a prompt
//
// 3. ArgAction::Count
//    - Counts how often a flag appears: -v = 1, -vv = 2
// -----------------------------------------------------------------------------
