// src/crawl/scope.rs
// =============================================================================
// Decides whether a discovered link belongs to the crawl.
//
// A link is admitted only when ALL of these hold:
// 1. It is an http(s) URL
// 2. Same host and port as the base URL (no subdomain matching)
// 3. Its path lives under the directory of the base URL's path
// 4. It does not point at a binary download (pdf, zip, office files...)
// 5. Its path has no action/edit/history/... markers
// 6. Its query string has no preview/diff/paging/... markers
// Optionally (space-only mode) the path must also sit inside a named
// documentation space such as /display/ or /spaces/.
//
// The filter never fails: anything unparseable is simply rejected.
// =============================================================================

use tracing::trace;
use url::Url;

/// File extensions that are never documents worth extracting text from.
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".tar", ".gz", ".tgz", ".rar", ".7z", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".odt", ".ods",
];

/// Path fragments that mark edit screens, histories, printable copies and
/// other non-canonical views of a page.
const PATH_BLOCKLIST: &[&str] = &[
    "action=edit",
    "action=history",
    "oldid=",
    "diff=",
    "printable=yes",
    "mobileaction=",
    "feed=",
    "redlink=1",
    "/pages/editpage",
    "/pages/viewpreviousversions",
    "/pages/diffpages",
    "/pages/viewpageattachments",
    "/pages/viewinfo",
    "/plugins/viewsource",
    "/exportword",
    "/spaces/flyingpdf",
    "/download/attachments/",
    "/download/export/",
    "/special:history",
    "/special:recentchanges",
    "/special:print",
    "/rss/",
    "/feeds/",
    "/redirect/",
];

/// Query-parameter fragments for previews, diffs, paging and attachment views.
const QUERY_BLOCKLIST: &[&str] = &[
    "action=",
    "oldid=",
    "diff=",
    "printable=",
    "mobileaction=",
    "redirect=",
    "preview",
    "pageversion",
    "originalid",
    "revisedversion",
    "startindex",
    "attachment",
    "showcomments",
    "focusedcommentid",
    "src=contextnavpagetreemode",
];

/// Path markers that identify a documentation space.
const SPACE_MARKERS: &[&str] = &["/display/", "/spaces/", "/wiki/", "/docs/"];

/// Tunable parts of the scope rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    /// Reject links ending in a known binary extension
    pub skip_binary_extensions: bool,
    /// Additionally require one of the documentation space markers in the path
    pub require_space_marker: bool,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self {
            skip_binary_extensions: true,
            require_space_marker: false,
        }
    }
}

/// Pure admission predicate for discovered links.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    policy: ScopePolicy,
}

impl ScopeFilter {
    pub fn new(policy: ScopePolicy) -> Self {
        Self { policy }
    }

    /// Returns true when `candidate` is inside the crawl scope defined by `base`.
    ///
    /// Both arguments are absolute URL strings. Malformed input is rejected.
    pub fn admit(&self, candidate: &str, base: &str) -> bool {
        let (candidate_url, base_url) = match (Url::parse(candidate), Url::parse(base)) {
            (Ok(c), Ok(b)) => (c, b),
            _ => {
                trace!(candidate, "rejected: unparseable URL");
                return false;
            }
        };

        match self.rejection(&candidate_url, &base_url) {
            Some(reason) => {
                trace!(candidate, reason, "rejected by scope filter");
                false
            }
            None => true,
        }
    }

    // Returns the first failed rule, or None if the link is admissible
    fn rejection(&self, candidate: &Url, base: &Url) -> Option<&'static str> {
        if !matches!(candidate.scheme(), "http" | "https") {
            return Some("not an http(s) link");
        }

        if candidate.host_str() != base.host_str() || candidate.port() != base.port() {
            return Some("different host");
        }

        if !candidate.path().starts_with(base_directory(base.path())) {
            return Some("outside base directory");
        }

        let path = candidate.path().to_lowercase();

        if self.policy.skip_binary_extensions
            && BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        {
            return Some("binary file extension");
        }

        if PATH_BLOCKLIST.iter().any(|marker| path.contains(marker)) {
            return Some("blocked path pattern");
        }

        if let Some(query) = candidate.query() {
            let query = query.to_lowercase();
            if QUERY_BLOCKLIST.iter().any(|marker| query.contains(marker)) {
                return Some("blocked query parameter");
            }
        }

        if self.policy.require_space_marker
            && !SPACE_MARKERS.iter().any(|marker| path.contains(marker))
        {
            return Some("outside documentation space");
        }

        None
    }
}

// Directory component of a URL path, the way a filesystem dirname works:
//   "/display/Proj"  -> "/display"
//   "/docs/"         -> "/docs"
//   "/index.html"    -> "/"
fn base_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => "",
    }
}
