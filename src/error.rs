// src/error.rs
// =============================================================================
// Error types shared across the crawler.
//
// Errors are split by how far they are allowed to travel:
// - FetchError: one page failed. The crawl logs it and moves on.
// - CheckpointError: saving progress failed. Logged, the crawl continues.
// - CredentialError: stored credentials could not be used. We fall back to
//   prompting the operator.
// - CrawlError: the crawl cannot start at all. This is the only fatal kind.
// =============================================================================

use thiserror::Error;

/// Why a single page produced no content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, TLS, redirect loop, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not finish within the client timeout
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-2xx status code
    #[error("HTTP {0}")]
    Status(u16),

    /// Response was not an HTML document
    #[error("not an HTML document (content-type: {0})")]
    NotHtml(String),

    /// Response body could not be read or decoded
    #[error("unreadable body: {0}")]
    Body(String),
}

/// Failure while persisting or reading `_progress/progress.json`.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while saving, loading or acquiring credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored password is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("key file has {0} bytes, expected 32")]
    InvalidKey(usize),

    #[error("stored password could not be decrypted or encrypted")]
    Crypto,

    #[error("could not read credentials from the terminal: {0}")]
    Prompt(String),
}

/// Startup failures. Nothing has been crawled when one of these is returned.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid start URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot prepare output directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Timeouts get their own variant, everything else stays transport-level.
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(error)
        }
    }
}
