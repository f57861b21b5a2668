//! Inverted index maintenance
//!
//! [`IndexWriter::reindex`] rebuilds the index rows of one page. Writers for
//! the same site are serialized through a fixed table of lock stripes so
//! concurrent lemma fetch-or-create never races within a site.

use crate::error::{Error, Result};
use crate::lemma::{LemmaExtractor, MIN_WORD_CHARS};
use crate::meta::MetaDb;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Number of lock stripes shared by all sites
const LOCK_STRIPES: usize = 64;

/// Fixed-size striped lock table keyed by site ID
pub struct SiteLocks {
    stripes: Vec<Mutex<()>>,
}

impl Default for SiteLocks {
    fn default() -> Self {
        Self::new(LOCK_STRIPES)
    }
}

impl SiteLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub async fn lock(&self, site_id: i64) -> MutexGuard<'_, ()> {
        let idx = site_id.rem_euclid(self.stripes.len() as i64) as usize;
        self.stripes[idx].lock().await
    }
}

/// Rebuilds per-page index rows
#[derive(Clone)]
pub struct IndexWriter {
    db: MetaDb,
    extractor: Arc<LemmaExtractor>,
    locks: Arc<SiteLocks>,
}

impl IndexWriter {
    pub fn new(db: MetaDb, extractor: Arc<LemmaExtractor>) -> Self {
        Self {
            db,
            extractor,
            locks: Arc::new(SiteLocks::default()),
        }
    }

    /// Replace the index rows of the page at `path` with lemmas from `content`
    ///
    /// Returns the number of index rows written. Blank content only clears
    /// the page's rows.
    pub async fn reindex(&self, site_id: i64, path: &str, content: &str) -> Result<usize> {
        let _guard = self.locks.lock(site_id).await;

        let page = self
            .db
            .get_page(site_id, path)
            .await?
            .ok_or_else(|| Error::PageNotFound(path.to_string()))?;

        if content.trim().is_empty() {
            self.db.clear_page_index(page.id).await?;
            return Ok(0);
        }

        let extractor = self.extractor.clone();
        let html = content.to_string();
        let counts = tokio::task::spawn_blocking(move || extractor.extract(&html))
            .await
            .map_err(|e| Error::Parse(format!("Lemma extraction failed: {}", e)))?;

        let lemmas: BTreeMap<String, u32> = counts
            .into_iter()
            .filter(|(lemma, _)| lemma.chars().count() >= MIN_WORD_CHARS)
            .collect();

        let written = self.db.replace_page_index(site_id, page.id, &lemmas).await?;
        debug!("Indexed {} lemmas for page {} of site {}", written, path, site_id);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (IndexWriter, MetaDb, i64, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = MetaDb::new(&tmp.path().join("test.db")).await.unwrap();
        let site = db.begin_site_indexing("https://a.test", "A").await.unwrap();
        let writer = IndexWriter::new(db.clone(), Arc::new(LemmaExtractor::default()));
        (writer, db, site.id, tmp)
    }

    #[tokio::test]
    async fn test_reindex_is_idempotent_for_rows() {
        let (writer, db, site_id, _tmp) = setup().await;
        let html = "<p>rust cargo rust</p>";
        let page = db.upsert_page(site_id, "/", 200, html).await.unwrap();

        assert_eq!(writer.reindex(site_id, "/", html).await.unwrap(), 2);
        assert_eq!(writer.reindex(site_id, "/", html).await.unwrap(), 2);
        assert_eq!(db.count_page_index(page).await.unwrap(), 2);

        let rust = db.get_lemma(site_id, "rust").await.unwrap().unwrap();
        let sums = db.rank_sums(&[page], &[rust.id]).await.unwrap();
        assert_eq!(sums.get(&page).copied(), Some(2.0));
        // Cumulative frequency counts both passes
        assert_eq!(rust.frequency, 4);
    }

    #[tokio::test]
    async fn test_blank_content_clears_rows() {
        let (writer, db, site_id, _tmp) = setup().await;
        let page = db.upsert_page(site_id, "/p", 200, "<p>rust</p>").await.unwrap();
        writer.reindex(site_id, "/p", "<p>rust</p>").await.unwrap();
        assert_eq!(db.count_page_index(page).await.unwrap(), 1);

        assert_eq!(writer.reindex(site_id, "/p", "  ").await.unwrap(), 0);
        assert_eq!(db.count_page_index(page).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_page_is_an_error() {
        let (writer, _db, site_id, _tmp) = setup().await;
        let err = writer.reindex(site_id, "/nope", "<p>rust</p>").await.unwrap_err();
        assert!(matches!(err, Error::PageNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_pages_share_lemmas() {
        let (writer, db, site_id, _tmp) = setup().await;
        let mut handles = Vec::new();
        for i in 0..8 {
            let path = format!("/p{}", i);
            db.upsert_page(site_id, &path, 200, "<p>shared</p>").await.unwrap();
            let writer = writer.clone();
            handles.push(tokio::spawn(async move {
                writer.reindex(site_id, &path, "<p>shared</p>").await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }

        assert_eq!(db.count_lemmas(site_id).await.unwrap(), 1);
        let shared = db.get_lemma(site_id, "shared").await.unwrap().unwrap();
        assert_eq!(shared.frequency, 8);
    }
}
