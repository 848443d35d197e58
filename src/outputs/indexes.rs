//! mdBook navigation for Markdown output.
//!
//! `SUMMARY.md` is regenerated from scratch on every build, since the store is
//! the only source of truth for which editions exist:
//!
//! ```text
//! # Summary
//!
//! [Kids News & Activities](./index.md)
//!
//! # Editions
//!
//! - [June 2024]()
//!     - [2024-06-01](./2024-06-01/index.md)
//! - [May 2024]()
//!     - [2024-05-31](./2024-05-31/index.md)
//! ```
//!
//! Month entries are mdBook draft chapters: headings without a page of their
//! own.

use super::page_path;
use crate::config::SiteConfig;
use crate::models::DateKey;
use crate::page::PageRequest;
use crate::utils::escape_markdown;
use itertools::Itertools;
use std::fmt::Write;

/// Build `SUMMARY.md` for `editions`, which must already be ordered most
/// recent first. The home page is linked only when `home_rendered`, so a
/// skipped home page does not become an empty chapter.
pub fn summary_md(
    home_rendered: bool,
    editions: &[DateKey],
    site: &SiteConfig,
    extension: &str,
) -> String {
    let mut summary = String::new();

    let _ = writeln!(summary, "# Summary\n");
    if home_rendered {
        let home = page_path(&PageRequest::Home, extension);
        let _ = writeln!(
            summary,
            "[{}](./{})\n",
            escape_markdown(&site.title),
            home.display()
        );
    }

    if editions.is_empty() {
        return summary;
    }

    let _ = writeln!(summary, "# Editions\n");
    let months = editions
        .iter()
        .chunk_by(|key| key.date().format("%B %Y").to_string());
    for (month, keys) in &months {
        let _ = writeln!(summary, "- [{month}]()");
        for key in keys {
            let path = page_path(&PageRequest::Archive(key.clone()), extension);
            // mdBook wants forward slashes regardless of platform.
            let path = path.to_string_lossy().replace('\\', "/");
            let _ = writeln!(summary, "    - [{key}](./{path})");
        }
    }
    summary
}
