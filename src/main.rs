//! sitesearch CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sitesearch::{
    commands::{
        cmd_index, cmd_index_page, cmd_init, cmd_search, cmd_statistics, print_search_results,
        print_statistics,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
    search::SearchRequest,
    server, App,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sitesearch")]
#[command(version, about = "Site crawler and lemma search engine with an HTTP API", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration and create the index database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Serve the HTTP API
    Serve,

    /// Crawl and index every configured site in the foreground
    Index,

    /// Reindex a single page of an already indexed site
    IndexPage {
        /// Absolute page URL
        url: String,
    },

    /// Search the index
    Search {
        /// The search query
        query: String,

        /// Restrict results to one configured site URL
        #[arg(long)]
        site: Option<String>,

        /// Number of results to skip
        #[arg(long, default_value = "0")]
        offset: i64,

        /// Maximum number of results (defaults to search.default_limit)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Show index statistics
    Stats,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => return handle_init(cli.config, force).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sitesearch", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;
    let app = App::build(config).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Serve => server::serve(app).await?,

        Commands::Index => {
            let report = cmd_index(&app).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_statistics(&report);
            }
        }

        Commands::IndexPage { url } => {
            let rows = cmd_index_page(&app, &url).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "result": true, "lemmas": rows }));
            } else {
                println!("✓ Indexed {} ({} lemmas)", url, rows);
            }
        }

        Commands::Search {
            query,
            site,
            offset,
            limit,
        } => {
            let request = SearchRequest {
                query,
                site,
                offset,
                limit: limit.unwrap_or(app.config.search.default_limit),
            };
            let results = cmd_search(&app, &request).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_search_results(&results, offset);
            }
        }

        Commands::Stats => {
            let report = cmd_statistics(&app).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_statistics(&report);
            }
        }
    }

    Ok(())
}

async fn handle_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    // A .toml path names the config file itself, anything else its directory
    let base_dir = path.map(|p| {
        if p.extension().is_some_and(|e| e == "toml") {
            p.parent().map(PathBuf::from).unwrap_or_else(Config::default_base_dir)
        } else {
            p
        }
    });

    let config = cmd_init(base_dir, force).await?;

    println!("✓ sitesearch initialized successfully");
    println!("  Config: {}", config.paths.config_file.display());
    println!("  Database: {}", config.paths.db_file.display());
    println!("\nNext steps:");
    println!("  1. Add the sites to crawl under [[sites]] in the config file");
    println!("  2. Index them: sitesearch index");
    println!("  3. Serve the API: sitesearch serve");

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);
    Config::load(&config_path)
}
