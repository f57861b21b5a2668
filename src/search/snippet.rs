//! Result snippets with highlighted keywords

use crate::parse::visible_text;
use regex::{Regex, RegexBuilder};

/// Characters kept before the first keyword
const CONTEXT_BEFORE: usize = 50;
/// Characters kept after the end of the first keyword
const CONTEXT_AFTER: usize = 100;
/// Length of the fallback snippet when no keyword occurs
const FALLBACK_LEN: usize = 200;

const ELLIPSIS: &str = "...";

/// Build a snippet of the page's visible text around the earliest keyword
pub fn build_snippet(content: &str, keywords: &[String]) -> String {
    let text: Vec<char> = visible_text(content).chars().collect();
    if text.is_empty() {
        return String::new();
    }

    let lowered: Vec<char> = text
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let first = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .filter_map(|k| {
            let needle: Vec<char> = k.chars().collect();
            find_chars(&lowered, &needle).map(|idx| (idx, needle.len()))
        })
        .min_by_key(|(idx, _)| *idx);

    let (start, end) = match first {
        Some((idx, len)) => (
            idx.saturating_sub(CONTEXT_BEFORE),
            (idx + len + CONTEXT_AFTER).min(text.len()),
        ),
        None => (0, FALLBACK_LEN.min(text.len())),
    };

    let window: String = text[start..end].iter().collect();
    let mut snippet = match highlighter(keywords) {
        Some(re) => highlight(&re, &window),
        None => escape_html(&window),
    };

    if start > 0 {
        snippet.insert_str(0, ELLIPSIS);
    }
    if end < text.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Wrap every match in `<b>`, escaping the raw text around and inside it
fn highlight(re: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        out.push_str("<b>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</b>");
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Case-insensitive alternation of all keywords, longest first
fn highlighter(keywords: &[String]) -> Option<Regex> {
    let mut escaped: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k))
        .collect();
    if escaped.is_empty() {
        return None;
    }
    escaped.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));

    RegexBuilder::new(&escaped.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
