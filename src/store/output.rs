// src/store/output.rs
// =============================================================================
// Writes the extracted text of each crawled page to its own file.
//
// File name:  <host>_<path>[_<query>]_<url hash>_<unix seconds>.txt
//   e.g.      wiki_example_com_display_Proj_Home_9c1e04a7d3b2f580_1760000000.txt
// File body:  URL: <url>
//             Time: <RFC 3339 timestamp>
//             <blank line>
//             <text>
//
// Every character that is not ASCII alphanumeric or '-' becomes '_', so the
// name is safe on every filesystem. Sanitizing and truncating can map two
// URLs onto the same readable part (/a/b and /a_b, or /a and /a#x), so the
// FNV-1a hash of the full URL keeps names apart within one run. The timestamp
// keeps repeated crawls of the same page from overwriting each other.
// =============================================================================

use chrono::{SecondsFormat, Utc};
use fnv::FnvHasher;
use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

// Keeps generated names well under common filesystem limits
const MAX_STEM_LEN: usize = 180;

#[derive(Debug, Clone)]
pub struct ContentWriter {
    dir: PathBuf,
}

impl ContentWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes one page. Returns the path of the new file.
    pub fn write(&self, url: &str, text: &str) -> io::Result<PathBuf> {
        let now = Utc::now();
        let path = self
            .dir
            .join(format!("{}_{:016x}_{}.txt", file_stem(url), url_hash(url), now.timestamp()));

        let body = format!(
            "URL: {}\nTime: {}\n\n{}\n",
            url,
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            text
        );
        fs::write(&path, body)?;
        Ok(path)
    }
}

// Builds the part of the file name that identifies the page
fn file_stem(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return truncate(sanitize(url));
    };

    let host = sanitize(parsed.host_str().unwrap_or("unknown"));
    let path = match parsed.path().trim_matches('/') {
        "" => "index".to_string(),
        path => sanitize(path),
    };

    let mut stem = format!("{host}_{path}");
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        stem.push('_');
        stem.push_str(&sanitize(query));
    }
    truncate(stem)
}

// FNV is stable across builds, so a page keeps its hash between runs
fn url_hash(url: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(url.as_bytes());
    hasher.finish()
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn truncate(mut stem: String) -> String {
    // sanitize() output is pure ASCII, so any byte index is a char boundary
    stem.truncate(MAX_STEM_LEN);
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_stem_for_page() {
        assert_eq!(
            file_stem("https://wiki.example.com/display/Proj/Home"),
            "wiki_example_com_display_Proj_Home"
        );
    }

    #[test]
    fn test_file_stem_for_root() {
        assert_eq!(file_stem("https://wiki.example.com/"), "wiki_example_com_index");
    }

    #[test]
    fn test_file_stem_keeps_query_apart() {
        assert_ne!(
            file_stem("https://wiki.example.com/viewpage?pageId=1"),
            file_stem("https://wiki.example.com/viewpage?pageId=2")
        );
    }

    #[test]
    fn test_file_stem_is_bounded() {
        let long = format!("https://example.com/{}", "a/".repeat(500));
        assert!(file_stem(&long).len() <= MAX_STEM_LEN);
    }

    #[test]
    fn test_write_includes_header_and_text() {
        let dir = tempdir().unwrap();
        let writer = ContentWriter::new(dir.path());
        let path = writer
            .write("https://wiki.example.com/display/Proj", "Hello\n\nWorld")
            .unwrap();

        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("URL: https://wiki.example.com/display/Proj\nTime: "));
        assert!(body.ends_with("\n\nHello\n\nWorld\n"));
        assert!(path.extension().is_some_and(|ext| ext == "txt"));
    }

    #[test]
    fn test_colliding_stems_get_separate_files() {
        let dir = tempdir().unwrap();
        let writer = ContentWriter::new(dir.path());
        let urls = [
            "https://wiki.example.com/a",
            "https://wiki.example.com/a#x",
            "https://wiki.example.com/a/b",
            "https://wiki.example.com/a_b",
        ];

        for url in urls {
            writer.write(url, "same second").unwrap();
        }

        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, urls.len());
    }

    #[test]
    fn test_url_hash_differs_for_fragment() {
        assert_ne!(
            url_hash("https://wiki.example.com/a"),
            url_hash("https://wiki.example.com/a#x")
        );
    }
}
