//! Index storage using SQLite
//!
//! This module handles all persistent state:
//! - Sites (configured sites and their indexing status)
//! - Pages (fetched documents keyed by site-relative path)
//! - Lemmas (per-site dictionary with cumulative frequency)
//! - Search index rows (lemma occurrences per page)

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on bound parameters per statement
const MAX_BIND_PARAMS: usize = 500;

/// Site indexing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteStatus::Indexing => write!(f, "INDEXING"),
            SiteStatus::Indexed => write!(f, "INDEXED"),
            SiteStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for SiteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "INDEXING" => Ok(SiteStatus::Indexing),
            "INDEXED" => Ok(SiteStatus::Indexed),
            "FAILED" => Ok(SiteStatus::Failed),
            _ => Err(Error::Parse(format!("Unknown site status: {}", s))),
        }
    }
}

/// A crawled site
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: String,
    pub status_time: String,
    pub last_error: Option<String>,
}

impl SiteRecord {
    pub fn get_status(&self) -> Result<SiteStatus> {
        self.status.parse()
    }

    /// Status time as milliseconds since the Unix epoch
    pub fn status_time_millis(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.status_time)
            .map(|t| t.timestamp_millis())
            .unwrap_or_default()
    }
}

/// A fetched page
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: i64,
    pub content: String,
}

/// A lemma in a site's dictionary
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: i64,
}

/// Index database handle
#[derive(Clone)]
pub struct MetaDb {
    pool: SqlitePool,
}

impl MetaDb {
    /// Connect to the index database described by the config
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::new(&config.paths.db_file).await
    }

    /// Create database with path directly, initializing the schema if needed
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30))
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };

        if !db.is_initialized().await? {
            db.init_schema().await?;
        }

        Ok(db)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='search_index'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    // ===== Site Operations =====

    /// Get site by canonical URL
    pub async fn get_site_by_url(&self, url: &str) -> Result<Option<SiteRecord>> {
        let site = sqlx::query_as::<_, SiteRecord>("SELECT * FROM sites WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    /// Get site by ID
    pub async fn get_site(&self, id: i64) -> Result<Option<SiteRecord>> {
        let site = sqlx::query_as::<_, SiteRecord>("SELECT * FROM sites WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    /// List all sites
    pub async fn list_sites(&self) -> Result<Vec<SiteRecord>> {
        let sites = sqlx::query_as::<_, SiteRecord>("SELECT * FROM sites ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(sites)
    }

    /// Create the site record, or reuse the existing one, and mark it INDEXING
    pub async fn begin_site_indexing(&self, url: &str, name: &str) -> Result<SiteRecord> {
        sqlx::query(
            r#"
            INSERT INTO sites (url, name, status, status_time, last_error)
            VALUES (?, ?, ?, ?, NULL)
            ON CONFLICT(url) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                status_time = excluded.status_time,
                last_error = NULL
            "#,
        )
        .bind(url)
        .bind(name)
        .bind(SiteStatus::Indexing.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_site_by_url(url)
            .await?
            .ok_or_else(|| Error::SiteNotFound(url.to_string()))
    }

    /// Set a site's status, stamping the status time
    pub async fn update_site_status(
        &self,
        id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE sites SET status = ?, status_time = ?, last_error = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(Utc::now().to_rfc3339())
            .bind(last_error)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete all pages, lemmas and index rows of a site
    pub async fn reset_site_data(&self, site_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM search_index WHERE page_id IN (SELECT id FROM pages WHERE site_id = ?)",
        )
        .bind(site_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pages WHERE site_id = ?")
            .bind(site_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM lemmas WHERE site_id = ?")
            .bind(site_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Cleared indexed data for site {}", site_id);
        Ok(())
    }

    // ===== Page Operations =====

    /// Insert or update a page, returning its ID
    pub async fn upsert_page(&self, site_id: i64, path: &str, code: i64, content: &str) -> Result<i64> {
        sqlx::query(
            r#"
            INSERT INTO pages (site_id, path, code, content)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(site_id, path) DO UPDATE SET
                code = excluded.code,
                content = excluded.content
            "#,
        )
        .bind(site_id)
        .bind(path)
        .bind(code)
        .bind(content)
        .execute(&self.pool)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM pages WHERE site_id = ? AND path = ?")
            .bind(site_id)
            .bind(path)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Get page by site and path
    pub async fn get_page(&self, site_id: i64, path: &str) -> Result<Option<PageRecord>> {
        let page = sqlx::query_as::<_, PageRecord>(
            "SELECT * FROM pages WHERE site_id = ? AND path = ?",
        )
        .bind(site_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    /// Load pages by ID
    pub async fn get_pages(&self, ids: &[i64]) -> Result<Vec<PageRecord>> {
        let mut pages = Vec::with_capacity(ids.len());
        for batch in ids.chunks(MAX_BIND_PARAMS) {
            let sql = format!(
                "SELECT * FROM pages WHERE id IN ({})",
                placeholders(batch.len())
            );
            let mut query = sqlx::query_as::<_, PageRecord>(&sql);
            for id in batch {
                query = query.bind(id);
            }
            pages.extend(query.fetch_all(&self.pool).await?);
        }
        Ok(pages)
    }

    /// Number of pages stored for a site
    pub async fn count_pages(&self, site_id: i64) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE site_id = ?")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    // ===== Lemma Operations =====

    /// Number of lemmas in a site's dictionary
    pub async fn count_lemmas(&self, site_id: i64) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lemmas WHERE site_id = ?")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Get a lemma row by site and text
    pub async fn get_lemma(&self, site_id: i64, lemma: &str) -> Result<Option<LemmaRecord>> {
        let record = sqlx::query_as::<_, LemmaRecord>(
            "SELECT * FROM lemmas WHERE site_id = ? AND lemma = ?",
        )
        .bind(site_id)
        .bind(lemma)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Find lemma rows matching any of the given texts, optionally within one site
    pub async fn find_lemmas(&self, site_id: Option<i64>, lemmas: &[String]) -> Result<Vec<LemmaRecord>> {
        if lemmas.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT * FROM lemmas WHERE lemma IN ({})",
            placeholders(lemmas.len())
        );
        if site_id.is_some() {
            sql.push_str(" AND site_id = ?");
        }

        let mut query = sqlx::query_as::<_, LemmaRecord>(&sql);
        for lemma in lemmas {
            query = query.bind(lemma);
        }
        if let Some(id) = site_id {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    // ===== Search Index Operations =====

    /// IDs of pages that contain a lemma
    pub async fn page_ids_for_lemma(&self, lemma_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT DISTINCT page_id FROM search_index WHERE lemma_id = ?")
                .bind(lemma_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    /// Sum of ranks per page over the given lemmas
    pub async fn rank_sums(&self, page_ids: &[i64], lemma_ids: &[i64]) -> Result<HashMap<i64, f64>> {
        let mut sums = HashMap::new();
        if page_ids.is_empty() || lemma_ids.is_empty() {
            return Ok(sums);
        }

        for batch in page_ids.chunks(MAX_BIND_PARAMS) {
            let sql = format!(
                "SELECT page_id, SUM(rank) FROM search_index \
                 WHERE page_id IN ({}) AND lemma_id IN ({}) GROUP BY page_id",
                placeholders(batch.len()),
                placeholders(lemma_ids.len())
            );
            let mut query = sqlx::query_as::<_, (i64, f64)>(&sql);
            for id in batch {
                query = query.bind(id);
            }
            for id in lemma_ids {
                query = query.bind(id);
            }
            for (page_id, sum) in query.fetch_all(&self.pool).await? {
                sums.insert(page_id, sum);
            }
        }
        Ok(sums)
    }

    /// Number of index rows attached to a page
    pub async fn count_page_index(&self, page_id: i64) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM search_index WHERE page_id = ?")
                .bind(page_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    /// Remove every index row of a page
    pub async fn clear_page_index(&self, page_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM search_index WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace a page's index rows in one transaction
    ///
    /// Each lemma is fetched or created under `site_id`, its cumulative
    /// frequency is increased by the local count, and one index row with
    /// `rank = count` is written. Returns the number of rows written.
    pub async fn replace_page_index(
        &self,
        site_id: i64,
        page_id: i64,
        lemmas: &BTreeMap<String, u32>,
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM search_index WHERE page_id = ?")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        for (lemma, count) in lemmas {
            sqlx::query(
                r#"
                INSERT INTO lemmas (site_id, lemma, frequency)
                VALUES (?, ?, ?)
                ON CONFLICT(site_id, lemma) DO UPDATE SET
                    frequency = frequency + excluded.frequency
                "#,
            )
            .bind(site_id)
            .bind(lemma)
            .bind(*count as i64)
            .execute(&mut *tx)
            .await?;

            let lemma_id: i64 =
                sqlx::query_scalar("SELECT id FROM lemmas WHERE site_id = ? AND lemma = ?")
                    .bind(site_id)
                    .bind(lemma)
                    .fetch_one(&mut *tx)
                    .await?;

            sqlx::query("INSERT INTO search_index (page_id, lemma_id, rank) VALUES (?, ?, ?)")
                .bind(page_id)
                .bind(lemma_id)
                .bind(*count as f64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(lemmas.len())
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
