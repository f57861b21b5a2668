//! Search command implementation

use crate::app::App;
use crate::error::Result;
use crate::search::{SearchRequest, SearchResults};

pub async fn cmd_search(app: &App, request: &SearchRequest) -> Result<SearchResults> {
    app.search.search(request).await
}

/// Print search results to console
pub fn print_search_results(results: &SearchResults, offset: i64) {
    if results.data.is_empty() {
        println!("No results found ({} total matches).", results.count);
        return;
    }

    println!("\n🔍 {} matching pages\n", results.count);

    for (i, hit) in results.data.iter().enumerate() {
        println!(
            "{}. {} ({:.3})",
            offset.max(0) as usize + i + 1,
            hit.title,
            hit.relevance
        );
        println!("   {}{} [{}]", hit.site, hit.uri, hit.site_name);
        println!("   {}", strip_highlight(&hit.snippet));
        println!();
    }
}

fn strip_highlight(snippet: &str) -> String {
    snippet.replace("<b>", "").replace("</b>", "")
}
