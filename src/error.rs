//! Custom error types for sitesearch

use thiserror::Error;

/// Main error type for sitesearch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Crawl error: {0}")]
    Crawl(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Morphology error: {0}")]
    Morphology(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Indexing is already running")]
    IndexingAlreadyRunning,

    #[error("Indexing is not running")]
    IndexingNotRunning,

    #[error("Indexing is in progress, please try again later")]
    IndexingInProgress,

    #[error("Page URL is empty")]
    EmptyUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("This page is outside the sites listed in the configuration file")]
    OutsideConfiguredSites,

    #[error("Pages with this extension are not indexed: {0}")]
    ExcludedExtension(String),

    #[error("Site has not been indexed yet, run full indexing first: {0}")]
    SiteNotIndexed(String),

    #[error("Empty search query")]
    EmptyQuery,

    #[error("The query contains no meaningful words")]
    NoMeaningfulWords,

    #[error("Site not found in index: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),
}

impl Error {
    /// Whether this error describes a rejected request rather than a failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::IndexingAlreadyRunning
                | Error::IndexingNotRunning
                | Error::IndexingInProgress
                | Error::EmptyUrl
                | Error::InvalidUrl(_)
                | Error::OutsideConfiguredSites
                | Error::ExcludedExtension(_)
                | Error::SiteNotIndexed(_)
                | Error::EmptyQuery
                | Error::NoMeaningfulWords
                | Error::SiteNotFound(_)
        )
    }
}

/// Result type alias for sitesearch
pub type Result<T> = std::result::Result<T, Error>;
