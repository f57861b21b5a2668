//! Statistics command implementation

use crate::app::App;
use crate::crawl::normalize_site_url;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status reported for a configured site that has never been crawled
pub const NOT_INDEXED: &str = "NOT_INDEXED";

/// Index totals across all configured sites
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalStatistics {
    pub sites: usize,
    pub indexing: bool,
    pub pages: u64,
    pub lemmas: u64,
}

/// Per-site detail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: String,
    pub error: Option<String>,
    pub status_time_epoch_millis: i64,
    pub pages: u64,
    pub lemmas: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total: TotalStatistics,
    pub detailed: Vec<SiteStatistics>,
}

/// Collect totals and per-site detail for every configured site
pub async fn cmd_statistics(app: &App) -> Result<StatisticsReport> {
    info!("Collecting statistics");

    let mut total = TotalStatistics {
        sites: app.config.sites.len(),
        indexing: app.indexing.is_running(),
        ..Default::default()
    };
    let mut detailed = Vec::with_capacity(app.config.sites.len());

    for site in &app.config.sites {
        let url = normalize_site_url(&site.url).unwrap_or_else(|_| site.url.clone());
        let record = app.db.get_site_by_url(&url).await?;

        let detail = match record {
            Some(record) => {
                let pages = app.db.count_pages(record.id).await?;
                let lemmas = app.db.count_lemmas(record.id).await?;
                SiteStatistics {
                    url: record.url.clone(),
                    name: record.name.clone(),
                    status_time_epoch_millis: record.status_time_millis(),
                    status: record.status,
                    error: record.last_error,
                    pages,
                    lemmas,
                }
            }
            None => SiteStatistics {
                url,
                name: site.name.clone(),
                status: NOT_INDEXED.to_string(),
                error: None,
                status_time_epoch_millis: 0,
                pages: 0,
                lemmas: 0,
            },
        };

        total.pages += detail.pages;
        total.lemmas += detail.lemmas;
        detailed.push(detail);
    }

    Ok(StatisticsReport { total, detailed })
}

/// Print statistics to console
pub fn print_statistics(report: &StatisticsReport) {
    println!("\n📊 sitesearch Statistics\n");
    println!("Sites: {}", report.total.sites);
    println!("Pages: {}", report.total.pages);
    println!("Lemmas: {}", report.total.lemmas);
    println!(
        "Indexing: {}",
        if report.total.indexing { "running" } else { "idle" }
    );

    if report.detailed.is_empty() {
        println!("\nNo sites configured. Add [[sites]] entries to the config file.");
        return;
    }

    println!();
    for site in &report.detailed {
        println!("• {} [{}]", site.name, site.status);
        println!("  URL: {}", site.url);
        println!("  Pages: {}, Lemmas: {}", site.pages, site.lemmas);
        if let Some(error) = &site.error {
            println!("  Error: {}", error);
        }
        println!();
    }
}
