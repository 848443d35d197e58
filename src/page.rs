//! The per-request render pipeline.
//!
//! Every page is produced by the same linear sequence:
//!
//! ```text
//! select_current_key -> read_edition -> list_edition_keys -> resolve_archive
//! ```
//!
//! The result is an [`EditionPage`], which a renderer turns into a document.

use crate::archive::{resolve_archive, select_current_key};
use crate::models::{DateKey, Edition, EditionIndex};
use crate::store::{EditionStore, StoreResult};
use std::fmt;
use tracing::{debug, instrument};

/// Which page is being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRequest {
    /// The landing page, showing the edition the index names as latest.
    Home,
    /// A specific edition by date.
    Archive(DateKey),
}

impl PageRequest {
    /// The explicitly requested key, if this is an archive view.
    pub fn requested_key(&self) -> Option<&DateKey> {
        match self {
            PageRequest::Home => None,
            PageRequest::Archive(key) => Some(key),
        }
    }

    /// Archive cap for this view: the home page is capped at
    /// `home_archive_limit`, archive views list everything.
    pub fn archive_limit(&self, home_archive_limit: usize) -> Option<usize> {
        match self {
            PageRequest::Home => Some(home_archive_limit),
            PageRequest::Archive(_) => None,
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRequest::Home => f.write_str("home"),
            PageRequest::Archive(key) => write!(f, "archive/{key}"),
        }
    }
}

/// Everything a renderer needs for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionPage {
    pub request: PageRequest,
    /// The key of the displayed edition.
    pub current_key: DateKey,
    pub edition: Edition,
    /// Other editions, most recent first, never containing `current_key`.
    pub archive: Vec<DateKey>,
}

/// Run the render pipeline for one request.
///
/// # Errors
///
/// Store errors from reading the edition or listing keys propagate unchanged;
/// there is no partial result. A `NotFound` here usually means the index
/// points at a deleted edition or the store changed after it was listed.
#[instrument(level = "info", skip_all, fields(%request))]
pub async fn load_page<S: EditionStore>(
    store: &S,
    index: &EditionIndex,
    request: PageRequest,
    home_archive_limit: usize,
) -> StoreResult<EditionPage> {
    let current_key = select_current_key(index, request.requested_key());
    let edition = store.read_edition(&current_key).await?;
    let all_keys = store.list_edition_keys().await?;
    let archive = resolve_archive(
        &all_keys,
        &current_key,
        request.archive_limit(home_archive_limit),
    );
    debug!(%current_key, archive = archive.len(), "Resolved page");

    Ok(EditionPage {
        request,
        current_key,
        edition,
        archive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::DEFAULT_HOME_ARCHIVE_LIMIT;
    use crate::store::memory::MemoryStore;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn story(id: i64, title: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "date_line": "June 01, 2024",
            "location": "Earth",
            "section": [],
            "why_it_matters": "It matters."
        })
    }

    fn edition(stories: Vec<serde_json::Value>) -> String {
        serde_json::json!({ "stories": stories }).to_string()
    }

    fn two_edition_store() -> MemoryStore {
        MemoryStore::new()
            .with("index", r#"{"latest":"2024-06-01"}"#)
            .with("2024-06-01", edition(vec![story(1, "One"), story(2, "Two")]))
            .with("2024-05-31", edition(vec![story(1, "Yesterday")]))
    }

    async fn index_of(store: &MemoryStore) -> EditionIndex {
        store.read_index().await.unwrap()
    }

    #[tokio::test]
    async fn test_home_page_shows_latest() {
        let store = two_edition_store();
        let index = index_of(&store).await;
        let page = load_page(&store, &index, PageRequest::Home, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap();

        assert_eq!(page.current_key, key("2024-06-01"));
        assert_eq!(page.edition.stories.len(), 2);
        assert_eq!(page.archive, vec![key("2024-05-31")]);
    }

    #[tokio::test]
    async fn test_archive_page_excludes_only_requested_key() {
        let store = two_edition_store();
        let index = index_of(&store).await;
        let request = PageRequest::Archive(key("2024-05-31"));
        let page = load_page(&store, &index, request, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap();

        assert_eq!(page.current_key, key("2024-05-31"));
        assert_eq!(page.edition.stories.len(), 1);
        assert_eq!(page.edition.stories[0].title, "Yesterday");
        assert_eq!(page.archive, vec![key("2024-06-01")]);
    }

    #[tokio::test]
    async fn test_home_archive_is_capped_but_archive_view_is_not() {
        let mut store = MemoryStore::new().with("index", r#"{"latest":"2024-01-10"}"#);
        for day in 1..=10 {
            store = store.with(&format!("2024-01-{day:02}"), edition(vec![]));
        }
        let index = index_of(&store).await;

        let home = load_page(&store, &index, PageRequest::Home, 3).await.unwrap();
        assert_eq!(
            home.archive,
            vec![key("2024-01-09"), key("2024-01-08"), key("2024-01-07")]
        );

        let request = PageRequest::Archive(key("2024-01-01"));
        let archive = load_page(&store, &index, request, 3).await.unwrap();
        assert_eq!(archive.archive.len(), 9);
        assert_eq!(archive.archive[0], key("2024-01-10"));
    }

    #[tokio::test]
    async fn test_latest_pointer_is_not_rederived() {
        // A later edition exists but is not yet latest.
        let store = two_edition_store().with("2024-06-02", edition(vec![story(9, "Scheduled")]));
        let index = index_of(&store).await;
        let page = load_page(&store, &index, PageRequest::Home, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap();

        assert_eq!(page.current_key, key("2024-06-01"));
        assert_eq!(page.archive, vec![key("2024-06-02"), key("2024-05-31")]);
    }

    #[tokio::test]
    async fn test_stale_latest_is_not_found() {
        let mut store = two_edition_store();
        let index = index_of(&store).await;
        store.remove("2024-06-01");

        let err = load_page(&store, &index, PageRequest::Home, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // Other requests are unaffected.
        let request = PageRequest::Archive(key("2024-05-31"));
        let page = load_page(&store, &index, request, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap();
        assert!(page.archive.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_edition_is_parse_error() {
        let store = two_edition_store().with("2024-06-01", r#"{"date":"2024-06-01"}"#);
        let index = index_of(&store).await;
        let err = load_page(&store, &index, PageRequest::Home, DEFAULT_HOME_ARCHIVE_LIMIT)
            .await
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_request_display() {
        assert_eq!(PageRequest::Home.to_string(), "home");
        assert_eq!(
            PageRequest::Archive(key("2024-05-31")).to_string(),
            "archive/2024-05-31"
        );
    }
}
