//! Data models for the edition store.
//!
//! This module defines the records read from the store:
//! - [`DateKey`]: The fixed-format `YYYY-MM-DD` identifier of an edition
//! - [`EditionIndex`]: The singleton record naming the latest edition
//! - [`Edition`]: The stories published for one calendar date
//! - [`Story`]: A single story within an edition
//!
//! Field names match the JSON written by the publishing job, so every
//! required field is decoded strictly: a story missing `title` or an edition
//! missing `stories` fails to deserialize instead of being defaulted.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-width shape of a [`DateKey`]. Calendar validity is checked separately.
static DATE_KEY_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static regex is valid"));

/// The `strftime` format of a [`DateKey`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Identifier of an edition: a calendar date in `YYYY-MM-DD` form.
///
/// The format is fixed width and zero padded, so the derived string ordering
/// is the chronological ordering. The resolver relies on this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    key: String,
    date: NaiveDate,
}

impl DateKey {
    /// Parse and validate a `DateKey`.
    ///
    /// # Errors
    ///
    /// Returns [`DateKeyError`] if `s` is not exactly `YYYY-MM-DD` or does not
    /// name a real calendar date (e.g. `2024-02-30`).
    pub fn parse(s: &str) -> Result<Self, DateKeyError> {
        if !DATE_KEY_SHAPE.is_match(s) {
            return Err(DateKeyError::Format(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map_err(|_| DateKeyError::NotACalendarDate(s.to_string()))?;
        Ok(DateKey {
            key: s.to_string(),
            date,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The calendar date this key names.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Long human-readable form, e.g. `Saturday, June 01, 2024`.
    pub fn display_date(&self) -> String {
        self.date().format("%A, %B %d, %Y").to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateKey::parse(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Error returned for strings that are not valid [`DateKey`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    /// The string is not in the fixed `YYYY-MM-DD` shape.
    Format(String),
    /// The string has the right shape but names no calendar date.
    NotACalendarDate(String),
}

impl fmt::Display for DateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateKeyError::Format(s) => write!(f, "invalid date key '{s}': expected YYYY-MM-DD"),
            DateKeyError::NotACalendarDate(s) => {
                write!(f, "invalid date key '{s}': not a calendar date")
            }
        }
    }
}

impl std::error::Error for DateKeyError {}

/// The singleton record naming the currently-latest edition.
///
/// `latest` is an authoritative pointer: it is not required to be the
/// greatest key in the store and is never re-derived by sorting. Extra fields
/// written by the publishing job (such as its own `archive` list) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditionIndex {
    /// Key of the edition shown on the home page.
    pub latest: DateKey,
}

/// The stories published for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Edition {
    /// The date the publishing job stamped on the file, if any.
    ///
    /// Informational only: the store key names the edition, and a stamp that
    /// disagrees with it is logged and otherwise ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateKey>,
    /// Preformatted heading date, e.g. `Saturday, June 01, 2024`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,
    /// The stories, in publication order. May be empty.
    pub stories: Vec<Story>,
}

impl Edition {
    /// Heading date for `key`: the stamped `display_date` when present,
    /// otherwise derived from the key.
    pub fn display_date_for(&self, key: &DateKey) -> String {
        match &self.display_date {
            Some(d) if !d.trim().is_empty() => d.clone(),
            _ => key.display_date(),
        }
    }

    /// The stamped `date`, when present and different from `key`.
    pub fn stamped_date_mismatch(&self, key: &DateKey) -> Option<&DateKey> {
        self.date.as_ref().filter(|stamped| *stamped != key)
    }
}

/// A single story within an edition.
///
/// Each story is independently renderable; `id` is unique within its edition
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Story {
    pub id: i64,
    /// The story headline.
    pub title: String,
    /// Byline date text, e.g. `June 01, 2024`.
    pub date_line: String,
    pub location: String,
    /// Body paragraphs in order. May be empty.
    pub section: Vec<String>,
    /// Closing explanation of why the story matters to readers.
    pub why_it_matters: String,
    /// Source article URL, when the publishing job recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Story {
    /// Extract the domain name (before .com/.org/etc) from the source link.
    /// For example: "https://www.cbsnews.com/news/x" -> "cbsnews"
    pub fn source_tag(&self) -> Option<String> {
        self.link.as_ref().and_then(|link| {
            let parsed = url::Url::parse(link).ok()?;
            let host = parsed.host_str()?;
            let parts: Vec<&str> = host.split('.').collect();
            if parts.len() >= 2 {
                Some(parts[parts.len() - 2].to_string())
            } else {
                None
            }
        })
    }
}
