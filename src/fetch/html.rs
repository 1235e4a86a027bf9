// src/fetch/html.rs
// =============================================================================
// Extracts readable text and links from an HTML page.
//
// Text:
// - Elements that never hold page content (script, style, nav, header,
//   footer, aside, noscript) are skipped together with everything inside
// - Each remaining text node is whitespace-collapsed and stripped of control
//   characters; fragments of a single character are dropped
// - Fragments are joined with blank lines
//
// Links:
// - <a href> inside the same boilerplate elements is ignored, so site menus
//   and footers never steer the crawl
// - Every other <a href> is resolved against the page URL
// - Anchors, mailto:, tel: and javascript: links are skipped
// - Only http(s) links survive; duplicates are removed, order is kept
//
// Rust concepts:
// - scraper::Html wraps an ego_tree; descendants() and ancestors() walk it
// - HashSet::insert returns false for duplicates, which keeps link order stable
// =============================================================================

use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

use super::PageResult;

/// Elements whose subtree is boilerplate rather than content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "template",
];

/// Parses `html` fetched from `page_url` into a `PageResult`.
pub fn extract_page(html: &str, page_url: &Url) -> PageResult {
    let document = Html::parse_document(html);
    PageResult {
        text: extract_text(&document),
        links: extract_links(&document, page_url),
    }
}

fn extract_text(document: &Html) -> String {
    let mut blocks = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        if node.ancestors().any(|ancestor| is_skipped(ancestor.value())) {
            continue;
        }

        let cleaned = clean_text(text);
        if cleaned.chars().count() > 1 {
            blocks.push(cleaned);
        }
    }

    blocks.join("\n\n")
}

fn is_skipped(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
}

// Collapses runs of whitespace and removes control characters
fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    // The selector is a constant, so parsing cannot fail at runtime
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if element.ancestors().any(|ancestor| is_skipped(ancestor.value())) {
            continue;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(link) = resolve_link(page_url, href.trim()) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

// Resolves a (possibly relative) href to an absolute http(s) URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://wiki.example.com/display/Proj/Home").unwrap()
    }

    #[test]
    fn test_extracts_body_text_without_boilerplate() {
        let html = r#"
            <html><head><title>Home</title><style>p { color: red }</style></head>
            <body>
              <header>Site header</header>
              <nav><a href="/x">Menu</a></nav>
              <h1>Project   Home</h1>
              <p>Welcome to
                 the project.</p>
              <script>var x = 1;</script>
              <footer>Copyright</footer>
            </body></html>
        "#;
        let result = extract_page(html, &page());
        assert_eq!(result.text, "Home\n\nProject Home\n\nWelcome to the project.");
    }

    #[test]
    fn test_drops_single_character_fragments() {
        let html = "<p>a</p><p>|</p><p>ok</p>";
        let result = extract_page(html, &page());
        assert_eq!(result.text, "ok");
    }

    #[test]
    fn test_resolves_relative_links() {
        let html = r#"<a href="Page2">Two</a><a href="/display/Proj/Three">Three</a>"#;
        let result = extract_page(html, &page());
        assert_eq!(
            result.links,
            vec![
                "https://wiki.example.com/display/Proj/Page2",
                "https://wiki.example.com/display/Proj/Three",
            ]
        );
    }

    #[test]
    fn test_skips_non_web_links_and_duplicates() {
        let html = r##"
            <a href="#top">Top</a>
            <a href="mailto:team@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="Page2">Two</a>
            <a href="Page2">Two again</a>
        "##;
        let result = extract_page(html, &page());
        assert_eq!(result.links, vec!["https://wiki.example.com/display/Proj/Page2"]);
    }

    #[test]
    fn test_keeps_fragment_on_resolved_link() {
        let html = r#"<a href="Page2#intro">Two</a>"#;
        let result = extract_page(html, &page());
        assert_eq!(result.links, vec!["https://wiki.example.com/display/Proj/Page2#intro"]);
    }

    #[test]
    fn test_clean_text_strips_control_characters() {
        assert_eq!(clean_text("a\u{0007}b   c\n\td"), "ab c d");
    }

    #[test]
    fn test_ignores_links_in_menus_and_footers() {
        let html = r#"
            <header><a href="/display/Proj/Top">Top</a></header>
            <nav><a href="/display/Proj/NavOnly">Menu</a></nav>
            <aside><a href="Related">Related</a></aside>
            <p>See <a href="Body">the body link</a>.</p>
            <footer><a href="/display/Proj/Foot">Footer</a></footer>
        "#;
        let result = extract_page(html, &page());
        assert_eq!(result.links, vec!["https://wiki.example.com/display/Proj/Body"]);
    }
}
