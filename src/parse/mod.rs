//! Document parsing and text extraction
//!
//! This module handles:
//! - Visible text extraction from HTML
//! - Title and link extraction
//! - Content type checks for fetched responses

mod html;

pub use html::*;

/// Content types we can index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Other,
}

impl ContentType {
    /// Detect content type from a `Content-Type` header value
    pub fn from_mime(mime: &str) -> Self {
        let mime_lower = mime.to_lowercase();
        let essence = mime_lower.split(';').next().unwrap_or("").trim();
        match essence {
            "text/html" | "application/xhtml+xml" => ContentType::Html,
            _ => ContentType::Other,
        }
    }
}

/// Check whether a `Content-Type` header denotes an indexable HTML document
pub fn is_html_content_type(mime: Option<&str>) -> bool {
    mime.map(ContentType::from_mime) == Some(ContentType::Html)
}

/// Collapse every whitespace run into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
