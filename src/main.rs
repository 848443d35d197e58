//! # Kids News Site
//!
//! Renders a directory of dated JSON news digests into a static site: a home
//! page showing the latest edition with a short list of past editions, and
//! one page per edition with the full archive.
//!
//! ## Usage
//!
//! ```sh
//! kids_news_site -d ./data -o ./site
//! ```
//!
//! ## Architecture
//!
//! Every page goes through the same pipeline:
//! 1. **Selection**: Pick the edition to show (`index.json`'s `latest`, or a date)
//! 2. **Reading**: Load and strictly decode that edition from the store
//! 3. **Archive**: List the other editions, most recent first
//! 4. **Output**: Render with the chosen format and write to disk

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod archive;
mod cli;
mod config;
mod models;
mod outputs;
mod page;
mod store;
mod utils;

use cli::{Cli, OutputFormat};
use config::SiteConfig;
use outputs::html::HtmlRenderer;
use outputs::markdown::MarkdownRenderer;
use outputs::site::{BuildReport, build_site};
use store::DirectoryStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("kids_news_site starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.data_dir, ?args.output_dir, ?args.format, "Parsed CLI arguments");

    let site = match SiteConfig::from_cli(&args).await {
        Ok(site) => site,
        Err(e) => {
            error!(error = %e, "Failed to load site configuration");
            return Err(e.into());
        }
    };

    let store = DirectoryStore::new(&args.data_dir);
    info!(data_dir = %store.root().display(), output_dir = %args.output_dir.display(), "Building site");

    let result = match args.format {
        OutputFormat::Html => build_site(&store, &HtmlRenderer, &site, &args.output_dir).await,
        OutputFormat::Markdown => {
            build_site(&store, &MarkdownRenderer, &site, &args.output_dir).await
        }
    };
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Site build aborted");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    check_report(&report)
}

/// Turn an incomplete build into a non-zero exit.
fn check_report(report: &BuildReport) -> Result<(), Box<dyn Error>> {
    for (request, reason) in &report.skipped {
        info!(%request, %reason, "Skipped page");
    }
    if report.is_success() {
        return Ok(());
    }
    if !report.home_rendered() {
        return Err("home page was not rendered".into());
    }
    Err(format!("{} page(s) failed to render", report.failed.len()).into())
}
