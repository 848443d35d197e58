//! Output generation: renderers and the site writer.
//!
//! # Submodules
//!
//! - [`html`]: Renders an [`EditionPage`] as a standalone HTML document
//! - [`markdown`]: Renders an [`EditionPage`] as Markdown for mdBook
//! - [`indexes`]: Builds the mdBook `SUMMARY.md` navigation file
//! - [`site`]: Runs the page pipeline for every page and writes the results
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html             # Home: latest edition + recent archive
//! ├── 2024-06-01/
//! │   └── index.html         # Edition page + full archive
//! └── 2024-05-31/
//!     └── index.html
//! ```
//!
//! Markdown output has the same layout with `.md` files plus `SUMMARY.md`.

pub mod html;
pub mod indexes;
pub mod markdown;
pub mod site;

use crate::config::SiteConfig;
use crate::page::{EditionPage, PageRequest};
use site::BuildReport;
use std::path::PathBuf;

/// A presentation strategy for edition pages.
///
/// Renderers are pure: they turn an already-resolved [`EditionPage`] into a
/// document and never touch the store or the filesystem.
pub trait Renderer {
    /// File extension of rendered pages, without the dot.
    fn extension(&self) -> &'static str;

    /// Render one page.
    fn render(&self, page: &EditionPage, site: &SiteConfig) -> String;

    /// Extra navigation documents to write once every page is rendered, as
    /// `(path relative to the output directory, contents)` pairs. Only pages
    /// in `report.rendered` exist on disk and may be linked.
    fn index_documents(&self, _report: &BuildReport, _site: &SiteConfig) -> Vec<(PathBuf, String)> {
        Vec::new()
    }
}

/// Location of a page relative to the output directory.
///
/// The home page is `index.<ext>`; each edition is `<DateKey>/index.<ext>`,
/// matching the `{base_path}{DateKey}/` links the renderers emit.
pub fn page_path(request: &PageRequest, extension: &str) -> PathBuf {
    let file_name = format!("index.{extension}");
    match request {
        PageRequest::Home => PathBuf::from(file_name),
        PageRequest::Archive(key) => PathBuf::from(key.as_str()).join(file_name),
    }
}
