//! Archive resolution and edition selection.
//!
//! Both functions are pure: they take what the store reported and return a
//! value, with no I/O and no failure modes.

use crate::models::{DateKey, EditionIndex};
use itertools::Itertools;

/// Number of archive entries shown on the home page unless configured
/// otherwise.
pub const DEFAULT_HOME_ARCHIVE_LIMIT: usize = 5;

/// Compute the editions to list as navigation next to `current_key`.
///
/// `current_key` is removed if present (it need not be), the rest are sorted
/// most recent first, and the result is truncated to `limit` entries when a
/// limit is given. Duplicates in `all_keys` collapse to one entry, and the
/// result does not depend on the order `all_keys` yields its items in.
///
/// # Examples
///
/// ```ignore
/// let archive = resolve_archive(&keys(["2024-01-01", "2024-01-03", "2024-01-02"]), &key("2024-01-03"), None);
/// assert_eq!(archive, keys(["2024-01-02", "2024-01-01"]));
/// ```
pub fn resolve_archive<'a, I>(all_keys: I, current_key: &DateKey, limit: Option<usize>) -> Vec<DateKey>
where
    I: IntoIterator<Item = &'a DateKey>,
{
    all_keys
        .into_iter()
        .filter(|key| *key != current_key)
        .sorted_unstable_by(|a, b| b.cmp(a))
        .dedup()
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Pick the edition a page displays.
///
/// An archive view names its edition explicitly and that key is used as-is;
/// whether it exists is for the store to decide. The home view shows
/// `index.latest`.
pub fn select_current_key(index: &EditionIndex, requested_key: Option<&DateKey>) -> DateKey {
    match requested_key {
        Some(key) => key.clone(),
        None => index.latest.clone(),
    }
}
