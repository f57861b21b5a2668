//! Full and single-page indexing lifecycle
//!
//! Only one full run may be active at a time. A run walks the configured
//! sites in order, resetting and recrawling each, and records the outcome on
//! the site's status. Stopping is cooperative: crawl tasks poll a
//! [`StopToken`] before each fetch and before following links.

mod state;

pub use state::*;

use crate::config::{Config, SiteConfig};
use crate::crawl::{excluded_extension, is_internal_link, normalize_path, normalize_site_url, CrawlScheduler};
use crate::error::{Error, Result};
use crate::meta::{MetaDb, SiteStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

/// Error text recorded on a site whose crawl was interrupted
pub const STOPPED_BY_USER: &str = "Indexing stopped by user";

/// Starts, stops and reports on indexing runs
pub struct IndexingService {
    sites: Vec<SiteConfig>,
    db: MetaDb,
    scheduler: Arc<CrawlScheduler>,
    state: Arc<IndexingState>,
    run: Mutex<Option<JoinHandle<()>>>,
}

impl IndexingService {
    pub fn new(
        config: &Config,
        db: MetaDb,
        scheduler: CrawlScheduler,
        state: Arc<IndexingState>,
    ) -> Self {
        Self {
            sites: config.sites.clone(),
            db,
            scheduler: Arc::new(scheduler),
            state,
            run: Mutex::new(None),
        }
    }

    /// Shared run state, also consulted by the search engine
    pub fn state(&self) -> Arc<IndexingState> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Begin a full run in the background; false if one is already running
    pub async fn start(self: &Arc<Self>) -> bool {
        if !self.state.try_begin() {
            return false;
        }

        let service = self.clone();
        let handle = tokio::spawn(async move {
            service.run_all().await;
        });
        *self.run.lock().await = Some(handle);
        true
    }

    /// Request the current run to stop; false if nothing is running
    pub fn stop(&self) -> bool {
        let requested = self.state.request_stop();
        if requested {
            info!("Stop requested for the running indexing");
        }
        requested
    }

    /// Wait for the current run, if any, to finish
    pub async fn wait_idle(&self) {
        let handle = self.run.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Indexing run ended abnormally: {}", e);
            }
        }
    }

    /// Stop the current run and give it `grace` to wind down before aborting it
    pub async fn shutdown(&self, grace: Duration) {
        self.state.request_stop();
        let handle = self.run.lock().await.take();
        let Some(mut handle) = handle else {
            return;
        };

        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            warn!("Indexing did not stop within {:?}, aborting", grace);
            handle.abort();
            self.state.finish();
        }
    }

    async fn run_all(&self) {
        info!("Starting full indexing of {} sites", self.sites.len());

        for site in &self.sites {
            if self.state.stop_requested() {
                info!("Indexing stopped before {}", site.url);
                break;
            }
            if let Err(e) = self.index_site(site).await {
                error!("Indexing of {} failed: {}", site.url, e);
            }
        }

        self.state.finish();
        info!("Full indexing finished");
    }

    async fn index_site(&self, config: &SiteConfig) -> Result<()> {
        let url = normalize_site_url(&config.url)?;
        let site = self.db.begin_site_indexing(&url, &config.name).await?;
        if let Err(e) = self.db.reset_site_data(site.id).await {
            self.db
                .update_site_status(site.id, SiteStatus::Failed, Some(&e.to_string()))
                .await?;
            return Err(e);
        }

        let scheduler = self.scheduler.clone();
        let stop = self.state.stop_token();
        let crawl_site = site.clone();
        let crawl = tokio::spawn(async move { scheduler.crawl_site(&crawl_site, stop).await });

        let (status, message) = match crawl.await {
            Ok(Ok(outcome)) if outcome.stopped || self.state.stop_requested() => {
                info!("Crawl of {} stopped after {} pages", site.url, outcome.pages_indexed);
                (SiteStatus::Failed, Some(STOPPED_BY_USER.to_string()))
            }
            Ok(Ok(outcome)) => {
                info!("Site {} indexed: {} pages", site.url, outcome.pages_indexed);
                (SiteStatus::Indexed, None)
            }
            Ok(Err(e)) => {
                error!("Crawl of {} failed: {}", site.url, e);
                (SiteStatus::Failed, Some(e.to_string()))
            }
            Err(e) => {
                error!("Crawl of {} panicked: {}", site.url, e);
                (SiteStatus::Failed, Some(format!("Crawl error: {}", e)))
            }
        };

        self.db
            .update_site_status(site.id, status, message.as_deref())
            .await
    }

    /// Fetch and reindex one page of a configured site that was already indexed
    ///
    /// Returns the number of index rows written.
    pub async fn index_single_page(&self, raw_url: &str) -> Result<usize> {
        if self.state.is_running() {
            return Err(Error::IndexingInProgress);
        }

        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return Err(Error::EmptyUrl);
        }

        let url = Url::parse(raw_url).map_err(|_| Error::InvalidUrl(raw_url.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(raw_url.to_string()));
        }

        let site_url = self
            .sites
            .iter()
            .filter_map(|s| normalize_site_url(&s.url).ok())
            .find(|site_url| is_internal_link(url.as_str(), site_url))
            .ok_or(Error::OutsideConfiguredSites)?;

        let site = self
            .db
            .get_site_by_url(&site_url)
            .await?
            .ok_or_else(|| Error::SiteNotIndexed(site_url.clone()))?;

        if let Some(ext) = excluded_extension(url.path()) {
            return Err(Error::ExcludedExtension(ext.to_string()));
        }

        let path = normalize_path(url.path());
        self.scheduler.index_page(&site, &path).await
    }
}
