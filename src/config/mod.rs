//! Configuration management for sitesearch
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sites to crawl and index, in crawl order
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Web crawling configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// A configured site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
}

/// Web crawling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Lower bound of the random pause before each fetch
    #[serde(default = "default_crawl_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the random pause before each fetch
    #[serde(default = "default_crawl_delay_max_ms")]
    pub delay_max_ms: u64,

    /// User agent string
    #[serde(default = "default_crawl_user_agent")]
    pub user_agent: String,

    /// Referer header value
    #[serde(default = "default_crawl_referrer")]
    pub referrer: String,

    /// Request timeout in seconds
    #[serde(default = "default_crawl_timeout")]
    pub timeout_secs: u64,

    /// Concurrent fetch workers per site (defaults to available parallelism)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Seconds to wait for an interrupted crawl before aborting it
    #[serde(default = "default_server_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when a request does not specify one
    #[serde(default = "default_search_limit")]
    pub default_limit: i64,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    pub base_dir: PathBuf,
    pub config_file: PathBuf,
    pub db_file: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            delay_min_ms: default_crawl_delay_min_ms(),
            delay_max_ms: default_crawl_delay_max_ms(),
            user_agent: default_crawl_user_agent(),
            referrer: default_crawl_referrer(),
            timeout_secs: default_crawl_timeout(),
            workers: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_server_bind(),
            shutdown_grace_secs: default_server_shutdown_grace(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
        }
    }
}

impl CrawlConfig {
    /// Effective number of concurrent fetch workers
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

impl Config {
    /// Get the default base directory for sitesearch (~/.sitesearch)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sitesearch")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("index.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {} (run 'sitesearch init' first)",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("index.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_config_path())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Config written by `sitesearch init`
    pub fn starter() -> Self {
        Self {
            sites: vec![SiteConfig {
                name: "Example".to_string(),
                url: "https://example.com".to_string(),
            }],
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "sites: name must not be empty (url {})",
                    site.url
                )));
            }

            let parsed = Url::parse(&site.url)
                .map_err(|e| Error::Config(format!("sites: invalid url '{}': {}", site.url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "sites: url must use http or https: {}",
                    site.url
                )));
            }

            let key = site.url.trim_end_matches('/').to_lowercase();
            if !seen.insert(key) {
                return Err(Error::Config(format!("sites: duplicate url {}", site.url)));
            }
        }

        if self.crawl.timeout_secs == 0 {
            return Err(Error::Config(
                "crawl.timeout_secs must be positive".to_string(),
            ));
        }

        if self.crawl.workers == Some(0) {
            return Err(Error::Config("crawl.workers must be positive".to_string()));
        }

        if self.crawl.delay_min_ms > self.crawl.delay_max_ms {
            warn!(
                "crawl.delay_min_ms ({}) exceeds crawl.delay_max_ms ({}); politeness delay disabled",
                self.crawl.delay_min_ms, self.crawl.delay_max_ms
            );
        }

        if self.search.default_limit <= 0 {
            return Err(Error::Config(
                "search.default_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
