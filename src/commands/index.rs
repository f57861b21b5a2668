//! Foreground indexing commands

use super::statistics::{cmd_statistics, StatisticsReport};
use crate::app::App;
use crate::error::{Error, Result};
use crate::progress::add_spinner;
use std::time::Duration;
use tracing::{info, warn};

/// Crawl every configured site, returning the statistics afterwards
///
/// Ctrl-C requests a cooperative stop; the command still waits for the
/// in-flight pages to finish before returning.
pub async fn cmd_index(app: &App) -> Result<StatisticsReport> {
    if !app.indexing.start().await {
        return Err(Error::IndexingAlreadyRunning);
    }

    let spinner = add_spinner("Indexing configured sites");
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let wait = app.indexing.wait_idle();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            _ = &mut wait => break,
            _ = ticker.tick() => {
                if let Ok(report) = cmd_statistics(app).await {
                    spinner.set_message(format!(
                        "Indexing: {} pages, {} lemmas",
                        report.total.pages, report.total.lemmas
                    ));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping indexing");
                app.indexing.stop();
            }
        }
    }

    spinner.finish_and_clear();
    info!("Indexing finished");
    cmd_statistics(app).await
}

/// Reindex a single page of an already crawled site
pub async fn cmd_index_page(app: &App, url: &str) -> Result<usize> {
    let rows = app.indexing.index_single_page(url).await?;
    info!("Indexed {} ({} lemmas)", url, rows);
    Ok(rows)
}
