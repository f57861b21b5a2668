//! Default values for configuration

/// Default minimum politeness delay between requests
pub fn default_crawl_delay_min_ms() -> u64 {
    500
}

/// Default maximum politeness delay between requests
pub fn default_crawl_delay_max_ms() -> u64 {
    1500
}

/// Default user agent
pub fn default_crawl_user_agent() -> String {
    format!("sitesearch/{} (Site Indexer)", env!("CARGO_PKG_VERSION"))
}

/// Default referrer header sent with every request
pub fn default_crawl_referrer() -> String {
    "https://www.google.com".to_string()
}

/// Default request timeout in seconds
pub fn default_crawl_timeout() -> u64 {
    10
}

/// Default HTTP bind address
pub fn default_server_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Grace period for in-flight crawl work on shutdown
pub fn default_server_shutdown_grace() -> u64 {
    5
}

/// Default page size for search results
pub fn default_search_limit() -> i64 {
    20
}
