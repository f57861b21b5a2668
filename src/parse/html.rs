//! HTML parsing and text extraction

use super::collapse_whitespace;
use scraper::{Html, Selector};
use url::Url;

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Placeholder title for pages without a `<title>`
pub const UNTITLED: &str = "Untitled";

/// Extract the text a reader would see in the document body
pub fn visible_text(content: &str) -> String {
    let document = Html::parse_document(content);

    let root = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Extract the document title, if present and non-blank
pub fn extract_title(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))?;

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Extract `a[href]` targets resolved against the page URL
pub fn extract_links(content: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(content);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|elem| elem.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter(|href| {
            let lower = href.to_lowercase();
            !["javascript:", "mailto:", "tel:", "data:"]
                .iter()
                .any(|scheme| lower.starts_with(scheme))
        })
        .filter_map(|href| base.join(href).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_hidden_elements() {
        let html = r#"<html><head><title>T</title><style>body { color: red }</style></head>
            <body><h1>Hello</h1><script>var x = 1;</script><p>visible   text</p>
            <noscript>enable js</noscript></body></html>"#;
        assert_eq!(visible_text(html), "Hello visible text");
    }

    #[test]
    fn test_visible_text_separates_blocks() {
        assert_eq!(visible_text("<p>one</p><p>two</p>"), "one two");
        assert_eq!(visible_text(""), "");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title>  My \n Page </title></head></html>"),
            Some("My Page".to_string())
        );
        assert_eq!(extract_title("<p>no title</p>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }

    #[test]
    fn test_extract_links() {
        let base = Url::parse("https://example.com/docs/intro").unwrap();
        let html = r##"
            <a href="/a">A</a>
            <a href="b?x=1">B</a>
            <a href="#top">skip</a>
            <a href="mailto:me@example.com">skip</a>
            <a href="javascript:void(0)">skip</a>
            <a href="https://other.test/c">C</a>
            <a>no href</a>
        "##;
        let links: Vec<String> = extract_links(html, &base)
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/docs/b?x=1",
                "https://other.test/c",
            ]
        );
    }
}
