//! Command-line interface definitions for Kids News Site.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The store and output locations can also be provided via environment
//! variables.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format of the generated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML pages.
    Html,
    /// Markdown pages plus an mdBook `SUMMARY.md`.
    Markdown,
}

/// Command-line arguments for the Kids News Site generator.
///
/// # Examples
///
/// ```sh
/// # Render HTML pages from ./data into ./site
/// kids_news_site -d ./data -o ./site
///
/// # Markdown for mdBook, hosted under /news/
/// kids_news_site -d ./data -o ./book/src -f markdown --base-path /news/
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding index.json and the dated edition files
    #[arg(short, long, env = "NEWS_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory the rendered pages are written to
    #[arg(short, long, env = "NEWS_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Optional path to a site.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Number of past editions listed on the home page (overrides the config file)
    #[arg(long)]
    pub archive_limit: Option<usize>,

    /// Path prefix for links between pages (overrides the config file)
    #[arg(long)]
    pub base_path: Option<String>,

    /// Site title (overrides the config file)
    #[arg(long)]
    pub title: Option<String>,
}
