//! Search over the lemma index
//!
//! A query matches a page only when every query lemma occurs on it (AND
//! semantics). Relevance is the sum of the page's ranks over the query
//! lemmas, normalized by the best candidate so the top hit scores 1.0.

mod query;
mod snippet;

pub use query::*;
pub use snippet::*;

use crate::crawl::normalize_site_url;
use crate::error::{Error, Result};
use crate::indexing::IndexingState;
use crate::meta::{LemmaRecord, MetaDb, SiteRecord};
use crate::parse::{extract_title, UNTITLED};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// A search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "crate::config::default_search_limit")]
    pub limit: i64,
}

/// One ranked page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub site: String,
    pub site_name: String,
    pub uri: String,
    pub title: String,
    pub snippet: String,
    pub relevance: f64,
}

/// A page of ranked hits plus the total number of matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<SearchHit>,
}

/// A matching page before pagination
struct Candidate {
    site_id: i64,
    page_id: i64,
    score: f64,
}

/// Answers queries against the index
pub struct SearchEngine {
    db: MetaDb,
    processor: QueryProcessor,
    state: Arc<IndexingState>,
}

impl SearchEngine {
    pub fn new(db: MetaDb, processor: QueryProcessor, state: Arc<IndexingState>) -> Self {
        Self {
            db,
            processor,
            state,
        }
    }

    /// Run a search, returning one page of ranked hits
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        if self.state.is_running() {
            return Err(Error::IndexingInProgress);
        }

        if request.query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let mut lemmas: Vec<String> = self.processor.process(&request.query).into_iter().collect();
        if lemmas.is_empty() {
            return Err(Error::NoMeaningfulWords);
        }
        lemmas.sort();
        debug!("Query '{}' -> lemmas {:?}", request.query, lemmas);

        let sites = self.sites_in_scope(request.site.as_deref()).await?;
        let scope = match request.site.as_deref() {
            Some(s) if !s.trim().is_empty() => sites.keys().next().copied(),
            _ => None,
        };

        let records = self.db.find_lemmas(scope, &lemmas).await?;
        let mut candidates = self.collect_candidates(records, lemmas.len()).await?;

        let max = candidates
            .iter()
            .map(|c| c.score)
            .fold(0.0_f64, f64::max);
        for candidate in &mut candidates {
            candidate.score = if max > 0.0 { candidate.score / max } else { 0.0 };
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    let a_url = sites.get(&a.site_id).map(|s| s.url.as_str());
                    let b_url = sites.get(&b.site_id).map(|s| s.url.as_str());
                    a_url.cmp(&b_url)
                })
                .then_with(|| a.page_id.cmp(&b.page_id))
        });

        let count = candidates.len();
        let window = page_window(count, request.offset, request.limit);
        let selected = &candidates[window];

        let keywords = self.processor.keywords(&request.query);
        let ids: Vec<i64> = selected.iter().map(|c| c.page_id).collect();
        let pages: HashMap<i64, _> = self
            .db
            .get_pages(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut data = Vec::with_capacity(selected.len());
        for candidate in selected {
            let (Some(page), Some(site)) = (pages.get(&candidate.page_id), sites.get(&candidate.site_id))
            else {
                continue;
            };
            data.push(SearchHit {
                site: site.url.trim_end_matches('/').to_string(),
                site_name: site.name.clone(),
                uri: page.path.clone(),
                title: extract_title(&page.content).unwrap_or_else(|| UNTITLED.to_string()),
                snippet: build_snippet(&page.content, &keywords),
                relevance: candidate.score,
            });
        }

        info!(
            "Search '{}' matched {} pages, returning {}",
            request.query,
            count,
            data.len()
        );
        Ok(SearchResults { count, data })
    }

    /// Sites a request may match, keyed by ID
    async fn sites_in_scope(&self, site: Option<&str>) -> Result<HashMap<i64, SiteRecord>> {
        match site.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let url = normalize_site_url(raw).map_err(|_| Error::SiteNotFound(raw.to_string()))?;
                let record = self
                    .db
                    .get_site_by_url(&url)
                    .await?
                    .ok_or_else(|| Error::SiteNotFound(raw.to_string()))?;
                Ok(HashMap::from([(record.id, record)]))
            }
            None => Ok(self
                .db
                .list_sites()
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()),
        }
    }

    /// Pages holding every query lemma, with their absolute scores
    async fn collect_candidates(
        &self,
        records: Vec<LemmaRecord>,
        wanted: usize,
    ) -> Result<Vec<Candidate>> {
        let mut by_site: HashMap<i64, Vec<LemmaRecord>> = HashMap::new();
        for record in records {
            by_site.entry(record.site_id).or_default().push(record);
        }

        let mut candidates = Vec::new();
        for (site_id, mut site_lemmas) in by_site {
            if site_lemmas.len() < wanted {
                continue;
            }
            site_lemmas.sort_by_key(|l| l.frequency);

            let mut pages: Option<HashSet<i64>> = None;
            for lemma in &site_lemmas {
                let ids: HashSet<i64> = self.db.page_ids_for_lemma(lemma.id).await?.into_iter().collect();
                let next = match pages {
                    None => ids,
                    Some(current) => current.intersection(&ids).copied().collect(),
                };
                let empty = next.is_empty();
                pages = Some(next);
                if empty {
                    break;
                }
            }

            let page_ids: Vec<i64> = pages.unwrap_or_default().into_iter().collect();
            if page_ids.is_empty() {
                continue;
            }

            let lemma_ids: Vec<i64> = site_lemmas.iter().map(|l| l.id).collect();
            let scores = self.db.rank_sums(&page_ids, &lemma_ids).await?;
            candidates.extend(page_ids.into_iter().map(|page_id| Candidate {
                site_id,
                page_id,
                score: scores.get(&page_id).copied().unwrap_or_default(),
            }));
        }

        Ok(candidates)
    }
}

/// Index range of the requested page, clamped to `len`; empty when out of range
pub fn page_window(len: usize, offset: i64, limit: i64) -> std::ops::Range<usize> {
    if offset < 0 || limit <= 0 {
        return 0..0;
    }
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
    let end = start
        .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
        .min(len);
    start..end
}
