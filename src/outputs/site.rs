//! Builds the whole site: the home page plus one page per edition.
//!
//! Each page is an independent render request. A request whose edition is
//! missing (a stale `latest` pointer, or an edition deleted after the store
//! was listed) is skipped; one whose edition does not decode is failed. In
//! both cases the remaining pages still render.

use super::{Renderer, page_path};
use crate::config::SiteConfig;
use crate::models::{DateKey, EditionIndex};
use crate::page::{PageRequest, load_page};
use crate::store::{EditionStore, StoreError};
use crate::utils::ensure_writable_dir;
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Maximum number of pages rendered concurrently.
pub const PAGE_CONCURRENCY: usize = 8;

/// Outcome of a [`build_site`] run, one entry per page request.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages written to disk.
    pub rendered: Vec<PageRequest>,
    /// Pages whose edition was not found, with the reason.
    pub skipped: Vec<(PageRequest, String)>,
    /// Pages that could not be decoded or written, with the reason.
    pub failed: Vec<(PageRequest, String)>,
}

impl BuildReport {
    pub fn home_rendered(&self) -> bool {
        self.rendered.contains(&PageRequest::Home)
    }

    /// A build succeeds when the home page exists and no page failed.
    /// Skipped archive pages do not fail a build.
    pub fn is_success(&self) -> bool {
        self.home_rendered() && self.failed.is_empty()
    }

    /// Keys of the edition pages that were written, most recent first.
    pub fn rendered_editions(&self) -> Vec<DateKey> {
        self.rendered
            .iter()
            .filter_map(|r| r.requested_key().cloned())
            .collect()
    }

    fn sort(&mut self) {
        self.rendered.sort_by(report_order);
        self.skipped.sort_by(|a, b| report_order(&a.0, &b.0));
        self.failed.sort_by(|a, b| report_order(&a.0, &b.0));
    }
}

/// Home first, then editions most recent first.
fn report_order(a: &PageRequest, b: &PageRequest) -> Ordering {
    match (a.requested_key(), b.requested_key()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(x),
    }
}

/// Render every page of the site into `output_dir`.
///
/// # Errors
///
/// Only failures that leave nothing to render abort the build: an unwritable
/// output directory, an unreadable index, or a store that cannot be listed,
/// plus failure to write the renderer's navigation documents. Per-page
/// problems are recorded in the returned [`BuildReport`].
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn build_site<S, R>(
    store: &S,
    renderer: &R,
    site: &SiteConfig,
    output_dir: &Path,
) -> Result<BuildReport, SiteError>
where
    S: EditionStore,
    R: Renderer + ?Sized,
{
    ensure_writable_dir(output_dir)
        .await
        .map_err(|err| SiteError::OutputDir {
            path: output_dir.to_owned(),
            err,
        })?;

    let index = store.read_index().await?;
    let keys = store.list_edition_keys().await?;

    let requests: Vec<PageRequest> = std::iter::once(PageRequest::Home)
        .chain(keys.into_iter().rev().map(PageRequest::Archive))
        .collect();
    info!(pages = requests.len(), latest = %index.latest, "Rendering pages");

    let index = &index;
    let outcomes: Vec<(PageRequest, Result<PathBuf, PageError>)> = stream::iter(requests)
        .map(|request| async move {
            let outcome = write_page(store, index, renderer, site, output_dir, &request).await;
            (request, outcome)
        })
        .buffer_unordered(PAGE_CONCURRENCY)
        .collect()
        .await;

    let mut report = BuildReport::default();
    for (request, outcome) in outcomes {
        match outcome {
            Ok(path) => {
                info!(%request, path = %path.display(), "Wrote page");
                report.rendered.push(request);
            }
            Err(PageError::Store(e)) if e.is_not_found() => {
                warn!(%request, error = %e, "Edition not found; skipping page");
                report.skipped.push((request, e.to_string()));
            }
            Err(PageError::Store(e)) if e.is_parse() => {
                error!(%request, error = %e, "Edition does not decode; page not rendered");
                report.failed.push((request, e.to_string()));
            }
            Err(e) => {
                error!(%request, error = %e, "Failed to render page");
                report.failed.push((request, e.to_string()));
            }
        }
    }
    report.sort();

    for (relative, contents) in renderer.index_documents(&report, site) {
        let path = output_dir.join(relative);
        fs::write(&path, contents)
            .await
            .map_err(|err| SiteError::Write {
                path: path.clone(),
                err,
            })?;
        info!(path = %path.display(), "Wrote navigation document");
    }

    info!(
        rendered = report.rendered.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Site build finished"
    );
    Ok(report)
}

/// Run the pipeline for one request and write the result.
async fn write_page<S, R>(
    store: &S,
    index: &EditionIndex,
    renderer: &R,
    site: &SiteConfig,
    output_dir: &Path,
    request: &PageRequest,
) -> Result<PathBuf, PageError>
where
    S: EditionStore,
    R: Renderer + ?Sized,
{
    let page = load_page(store, index, request.clone(), site.home_archive_limit)
        .await
        .map_err(PageError::Store)?;
    let document = renderer.render(&page, site);

    let path = output_dir.join(page_path(request, renderer.extension()));
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await.map_err(|err| PageError::Write {
            path: dir.to_owned(),
            err,
        })?;
    }
    fs::write(&path, document)
        .await
        .map_err(|err| PageError::Write {
            path: path.clone(),
            err,
        })?;
    Ok(path)
}

/// Why a single page was not written.
#[derive(Debug)]
enum PageError {
    Store(StoreError),
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Store(err) => write!(f, "{err}"),
            PageError::Write { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

/// The error type for building a site.
#[derive(Debug)]
pub enum SiteError {
    /// Returned when the output directory cannot be created or written to.
    OutputDir { path: PathBuf, err: io::Error },

    /// Returned when the index cannot be read or the store cannot be listed.
    Store(StoreError),

    /// Returned for I/O problems writing navigation documents.
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::OutputDir { path, err } => write!(
                f,
                "Output directory '{}' is not writable: {}",
                path.display(),
                err
            ),
            SiteError::Store(err) => write!(f, "{err}"),
            SiteError::Write { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::OutputDir { err, .. } => Some(err),
            SiteError::Store(err) => Some(err),
            SiteError::Write { err, .. } => Some(err),
        }
    }
}

impl From<StoreError> for SiteError {
    /// Converts [`StoreError`]s into [`SiteError`]. This allows us to use the
    /// `?` operator.
    fn from(err: StoreError) -> SiteError {
        SiteError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::html::HtmlRenderer;
    use crate::outputs::markdown::MarkdownRenderer;
    use crate::store::DirectoryStore;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn edition(titles: &[&str]) -> String {
        let stories: Vec<serde_json::Value> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                serde_json::json!({
                    "id": i + 1,
                    "title": title,
                    "date_line": "June 01, 2024",
                    "location": "Earth",
                    "section": ["A paragraph."],
                    "why_it_matters": "It matters."
                })
            })
            .collect();
        serde_json::json!({ "stories": stories }).to_string()
    }

    struct Fixture {
        _tmp: TempDir,
        data: PathBuf,
        out: PathBuf,
    }

    fn fixture(files: &[(&str, String)]) -> Fixture {
        let tmp = TempDir::new().expect("tempdir");
        let data = tmp.path().join("data");
        let out = tmp.path().join("site");
        stdfs::create_dir(&data).unwrap();
        for (name, body) in files {
            stdfs::write(data.join(name), body).unwrap();
        }
        Fixture {
            _tmp: tmp,
            data,
            out,
        }
    }

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_build_html_site() {
        let fx = fixture(&[
            ("index.json", r#"{"latest":"2024-06-01"}"#.to_string()),
            ("2024-06-01.json", edition(&["One", "Two"])),
            ("2024-05-31.json", edition(&["Yesterday"])),
        ]);
        let store = DirectoryStore::new(&fx.data);
        let report = build_site(&store, &HtmlRenderer, &SiteConfig::default(), &fx.out)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(
            report.rendered,
            vec![
                PageRequest::Home,
                PageRequest::Archive(key("2024-06-01")),
                PageRequest::Archive(key("2024-05-31")),
            ]
        );

        let home = stdfs::read_to_string(fx.out.join("index.html")).unwrap();
        assert!(home.contains("One") && home.contains("Two"));
        assert!(home.contains("href=\"/2024-05-31/\""));
        assert!(!home.contains("href=\"/2024-06-01/\""));

        let older = stdfs::read_to_string(fx.out.join("2024-05-31").join("index.html")).unwrap();
        assert!(older.contains("Yesterday"));
        assert!(older.contains("href=\"/2024-06-01/\""));
        assert!(older.contains("Back to latest"));

        assert!(fx.out.join("2024-06-01").join("index.html").exists());
        assert!(!fx.out.join("SUMMARY.md").exists());
    }

    #[tokio::test]
    async fn test_stale_latest_skips_home_but_renders_editions() {
        let fx = fixture(&[
            ("index.json", r#"{"latest":"2024-06-02"}"#.to_string()),
            ("2024-06-01.json", edition(&["One"])),
        ]);
        let store = DirectoryStore::new(&fx.data);
        let report = build_site(&store, &HtmlRenderer, &SiteConfig::default(), &fx.out)
            .await
            .unwrap();

        assert!(!report.home_rendered());
        assert!(!report.is_success());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, PageRequest::Home);
        assert_eq!(report.rendered, vec![PageRequest::Archive(key("2024-06-01"))]);
        assert!(!fx.out.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_stale_latest_leaves_home_out_of_summary() {
        let fx = fixture(&[
            ("index.json", r#"{"latest":"2024-06-02"}"#.to_string()),
            ("2024-06-01.json", edition(&["One"])),
        ]);
        let store = DirectoryStore::new(&fx.data);
        let report = build_site(&store, &MarkdownRenderer, &SiteConfig::default(), &fx.out)
            .await
            .unwrap();

        assert!(!report.home_rendered());
        let summary = stdfs::read_to_string(fx.out.join("SUMMARY.md")).unwrap();
        assert!(!summary.contains("(./index.md)"));
        assert!(summary.contains("(./2024-06-01/index.md)"));
    }

    #[tokio::test]
    async fn test_malformed_edition_fails_only_its_pages() {
        let fx = fixture(&[
            ("index.json", r#"{"latest":"2024-06-01"}"#.to_string()),
            ("2024-06-01.json", edition(&["One"])),
            ("2024-05-31.json", r#"{"headlines": []}"#.to_string()),
        ]);
        let store = DirectoryStore::new(&fx.data);
        let report = build_site(&store, &HtmlRenderer, &SiteConfig::default(), &fx.out)
            .await
            .unwrap();

        assert!(report.home_rendered());
        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PageRequest::Archive(key("2024-05-31")));
        assert!(report.failed[0].1.contains("2024-05-31"));
        assert!(!fx.out.join("2024-05-31").exists());
    }

    #[tokio::test]
    async fn test_missing_index_aborts_build() {
        let fx = fixture(&[("2024-06-01.json", edition(&["One"]))]);
        let store = DirectoryStore::new(&fx.data);
        let err = build_site(&store, &HtmlRenderer, &SiteConfig::default(), &fx.out)
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Store(ref e) if e.is_not_found()), "{err}");
    }

    #[tokio::test]
    async fn test_build_markdown_site_writes_summary() {
        let fx = fixture(&[
            ("index.json", r#"{"latest":"2024-06-01"}"#.to_string()),
            ("2024-06-01.json", edition(&["One"])),
            ("2024-05-31.json", edition(&["Yesterday"])),
        ]);
        let store = DirectoryStore::new(&fx.data);
        let mut site = SiteConfig::default();
        site.home_archive_limit = 0;
        let report = build_site(&store, &MarkdownRenderer, &site, &fx.out)
            .await
            .unwrap();

        assert!(report.is_success());
        let home = stdfs::read_to_string(fx.out.join("index.md")).unwrap();
        assert!(!home.contains("(/2024-05-31/)"));

        let summary = stdfs::read_to_string(fx.out.join("SUMMARY.md")).unwrap();
        let june = summary.find("./2024-06-01/index.md").unwrap();
        let may = summary.find("./2024-05-31/index.md").unwrap();
        assert!(june < may);
    }
}
