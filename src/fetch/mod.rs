// src/fetch/mod.rs
// =============================================================================
// The fetch-and-extract collaborator.
//
// The crawl controller only needs one thing from the outside world: "give me
// the text and the links of this URL". That contract is the `Fetch` trait.
//
// Submodules:
// - http: the real implementation on top of reqwest
// - html: turns an HTML body into text blocks and absolute links
// =============================================================================

mod html;
mod http;

pub use html::extract_page;
pub use http::{HttpFetcher, HttpOptions, DEFAULT_USER_AGENT};

use std::future::Future;

use crate::error::FetchError;

/// What a successful fetch produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Readable text of the page, blocks separated by blank lines
    pub text: String,
    /// Absolute outbound links, deduplicated, in document order
    pub links: Vec<String>,
}

/// Fetches one page and extracts its text and links.
///
/// Implementations must enforce a finite timeout per request. They may write
/// `async fn fetch`; the returned future has to be `Send` so a crawl can run
/// on a spawned task.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<PageResult, FetchError>> + Send;
}
