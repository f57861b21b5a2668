//! Site URL and page path helpers

use crate::error::{Error, Result};
use url::Url;

/// Extensions of resources that are never fetched as pages
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".webp", ".bmp", ".tiff", ".css", ".js",
    ".json", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".rtf", ".zip",
    ".rar", ".7z", ".tar", ".gz", ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".flv", ".wav", ".ogg",
    ".webm", ".woff", ".woff2", ".ttf", ".eot", ".otf", ".xml", ".rss", ".atom", ".txt", ".csv",
    ".exe", ".dmg", ".apk", ".jar", ".bin", ".iso", ".tar.gz", ".tgz",
];

/// Drop the query string and fragment
pub fn strip_query_and_fragment(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or("")
}

/// Normalize a page path: no query or fragment, no trailing slash, leading slash
pub fn normalize_path(path: &str) -> String {
    let trimmed = strip_query_and_fragment(path).trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// The excluded extension a path ends with, if any
pub fn excluded_extension(path: &str) -> Option<&'static str> {
    let lower = strip_query_and_fragment(path).to_lowercase();
    EXCLUDED_EXTENSIONS
        .iter()
        .copied()
        .filter(|ext| lower.ends_with(ext))
        .max_by_key(|ext| ext.len())
}

/// Whether a path may point at an HTML page
pub fn is_html_path(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('#') && excluded_extension(path).is_none()
}

/// Canonical form of a site URL: no query or fragment, path ending in one slash
pub fn normalize_site_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw.trim()).map_err(|_| Error::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(raw.to_string()));
    }
    url.set_query(None);
    url.set_fragment(None);
    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Ok(url.to_string())
}

fn without_scheme(url: &str) -> Option<&str> {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
}

/// Whether `link` lives under `site_url`, ignoring an http/https mismatch
pub fn is_internal_link(link: &str, site_url: &str) -> bool {
    match (without_scheme(link), without_scheme(site_url)) {
        (Some(link), Some(site)) => {
            let site = site.trim_end_matches('/');
            link.strip_prefix(site)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
        }
        _ => false,
    }
}

/// Site-relative page path of an absolute link
pub fn page_path(link: &Url) -> String {
    normalize_path(link.path())
}
