//! Wiring of the storage, indexing and search components

use crate::config::Config;
use crate::crawl::CrawlScheduler;
use crate::error::Result;
use crate::index::IndexWriter;
use crate::indexing::{IndexingService, IndexingState};
use crate::lemma::LemmaExtractor;
use crate::meta::MetaDb;
use crate::morph::Analyzer;
use crate::search::{QueryProcessor, SearchEngine};
use std::sync::Arc;

/// Everything a front end needs, built once from a loaded config
#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: MetaDb,
    pub indexing: Arc<IndexingService>,
    pub search: Arc<SearchEngine>,
}

impl App {
    pub async fn build(config: Config) -> Result<Self> {
        let db = MetaDb::connect(&config).await?;

        let analyzer = Analyzer::new();
        let extractor = Arc::new(LemmaExtractor::new(analyzer.clone()));
        let writer = IndexWriter::new(db.clone(), extractor);
        let scheduler = CrawlScheduler::new(&config.crawl, db.clone(), writer)?;

        let state = Arc::new(IndexingState::new());
        let indexing = Arc::new(IndexingService::new(
            &config,
            db.clone(),
            scheduler,
            state.clone(),
        ));
        let search = Arc::new(SearchEngine::new(
            db.clone(),
            QueryProcessor::new(analyzer),
            state,
        ));

        Ok(Self {
            config: Arc::new(config),
            db,
            indexing,
            search,
        })
    }
}
