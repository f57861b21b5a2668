//! Concurrent site crawling
//!
//! This module provides:
//! - Page fetching with politeness delays
//! - A bounded worker pool that walks a site's internal link graph
//! - Page persistence and reindexing for every fetched page
//! - Cooperative cancellation through a [`StopToken`]

mod fetch;
mod paths;

pub use fetch::*;
pub use paths::*;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::index::IndexWriter;
use crate::indexing::StopToken;
use crate::meta::{MetaDb, SiteRecord};
use crate::parse::extract_links;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

/// Summary of one site crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Pages fetched with status 200 and HTML content
    pub pages_indexed: usize,
    /// Distinct paths attempted
    pub paths_visited: usize,
    /// Whether the crawl ended because a stop was requested
    pub stopped: bool,
}

/// Crawls sites and keeps their pages and index rows current
pub struct CrawlScheduler {
    fetcher: Arc<Fetcher>,
    db: MetaDb,
    writer: IndexWriter,
    delay_ms: Option<(u64, u64)>,
    workers: usize,
}

/// State shared by every task of one site crawl
struct CrawlContext {
    fetcher: Arc<Fetcher>,
    db: MetaDb,
    writer: IndexWriter,
    delay_ms: Option<(u64, u64)>,
    site_id: i64,
    site_url: Url,
    visited: RwLock<HashSet<String>>,
    pages: AtomicUsize,
    stop: StopToken,
}

impl CrawlScheduler {
    pub fn new(config: &CrawlConfig, db: MetaDb, writer: IndexWriter) -> Result<Self> {
        let delay_ms = (config.delay_min_ms <= config.delay_max_ms)
            .then_some((config.delay_min_ms, config.delay_max_ms));

        Ok(Self {
            fetcher: Arc::new(Fetcher::new(config)?),
            db,
            writer,
            delay_ms,
            workers: config.worker_count().max(1),
        })
    }

    /// Crawl a site from its root path until the link graph is exhausted or a stop is requested
    pub async fn crawl_site(&self, site: &SiteRecord, stop: StopToken) -> Result<CrawlOutcome> {
        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            db: self.db.clone(),
            writer: self.writer.clone(),
            delay_ms: self.delay_ms,
            site_id: site.id,
            site_url: Url::parse(&site.url)?,
            visited: RwLock::new(HashSet::new()),
            pages: AtomicUsize::new(0),
            stop,
        });

        info!(
            "Crawling {} ({}) with {} workers",
            site.name, site.url, self.workers
        );

        let mut pending: VecDeque<String> = VecDeque::from(["/".to_string()]);
        let mut tasks: JoinSet<Vec<String>> = JoinSet::new();

        loop {
            if ctx.stop.is_stopped() {
                pending.clear();
            }

            while tasks.len() < self.workers {
                let Some(path) = pending.pop_front() else {
                    break;
                };
                tasks.spawn(visit(ctx.clone(), path));
            }

            match tasks.join_next().await {
                Some(Ok(children)) => pending.extend(children),
                Some(Err(e)) => {
                    tasks.abort_all();
                    return Err(Error::Crawl(format!("Crawl task failed: {}", e)));
                }
                None => break,
            }
        }

        let outcome = CrawlOutcome {
            pages_indexed: ctx.pages.load(Ordering::SeqCst),
            paths_visited: ctx.visited.read().await.len(),
            stopped: ctx.stop.is_stopped(),
        };

        info!(
            "Finished crawling {}: {} pages indexed, {} paths visited",
            site.url, outcome.pages_indexed, outcome.paths_visited
        );
        Ok(outcome)
    }

    /// Fetch, persist and reindex a single page of a site
    ///
    /// Returns the number of index rows written.
    pub async fn index_page(&self, site: &SiteRecord, path: &str) -> Result<usize> {
        let site_url = Url::parse(&site.url)?;
        let url = site_url.join(path)?;

        pause(self.delay_ms).await;

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                store_page(&self.db, &self.writer, site.id, path, 0, "").await?;
                return Err(e);
            }
        };

        let written = if page.is_indexable() {
            store_page(&self.db, &self.writer, site.id, path, 200, &page.body).await?
        } else {
            store_page(&self.db, &self.writer, site.id, path, page.status as i64, "").await?
        };

        info!("Indexed single page {} ({} lemmas)", url, written);
        Ok(written)
    }
}

/// Upsert a page and rebuild its index rows
async fn store_page(
    db: &MetaDb,
    writer: &IndexWriter,
    site_id: i64,
    path: &str,
    code: i64,
    content: &str,
) -> Result<usize> {
    db.upsert_page(site_id, path, code, content).await?;
    writer.reindex(site_id, path, content).await
}

async fn pause(delay_ms: Option<(u64, u64)>) {
    let Some((min, max)) = delay_ms else {
        return;
    };
    if max == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(min..=max);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Process one candidate path, returning the child paths to visit next
async fn visit(ctx: Arc<CrawlContext>, path: String) -> Vec<String> {
    if ctx.stop.is_stopped() {
        return Vec::new();
    }

    let path = strip_query_and_fragment(&path).to_string();
    if !is_html_path(&path) {
        return Vec::new();
    }

    if !ctx.visited.write().await.insert(path.clone()) {
        return Vec::new();
    }

    pause(ctx.delay_ms).await;

    let url = match ctx.site_url.join(&path) {
        Ok(url) => url,
        Err(e) => {
            warn!("Cannot resolve {} against {}: {}", path, ctx.site_url, e);
            return Vec::new();
        }
    };

    let page = match ctx.fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            if let Err(e) = store_page(&ctx.db, &ctx.writer, ctx.site_id, &path, 0, "").await {
                error!("Failed to record {}: {}", url, e);
            }
            return Vec::new();
        }
    };

    if !page.is_indexable() {
        debug!(
            "Skipping {} (status {}, type {:?})",
            url, page.status, page.content_type
        );
        if let Err(e) =
            store_page(&ctx.db, &ctx.writer, ctx.site_id, &path, page.status as i64, "").await
        {
            error!("Failed to record {}: {}", url, e);
        }
        return Vec::new();
    }

    if let Err(e) = ctx.db.upsert_page(ctx.site_id, &path, 200, &page.body).await {
        error!("Failed to save {}: {}", url, e);
        return Vec::new();
    }
    ctx.pages.fetch_add(1, Ordering::SeqCst);

    if let Err(e) = ctx.writer.reindex(ctx.site_id, &path, &page.body).await {
        error!("Failed to index {}: {}", url, e);
    }

    if ctx.stop.is_stopped() {
        return Vec::new();
    }

    let site_url = ctx.site_url.as_str();
    let candidates: HashSet<String> = extract_links(&page.body, &url)
        .into_iter()
        .filter(|link| is_internal_link(link.as_str(), site_url))
        .map(|link| page_path(&link))
        .filter(|p| is_html_path(p))
        .collect();

    let visited = ctx.visited.read().await;
    candidates
        .into_iter()
        .filter(|p| !visited.contains(p))
        .collect()
}
