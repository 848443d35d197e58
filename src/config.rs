//! Site configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags:
//!
//! ```yaml
//! title: Kids News & Activities
//! home_archive_limit: 5
//! base_path: /news/
//! ```
//!
//! Every key is optional; missing keys fall back to [`SiteConfig::default`].

use crate::archive::DEFAULT_HOME_ARCHIVE_LIMIT;
use crate::cli::Cli;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Site title used when none is configured.
pub const DEFAULT_TITLE: &str = "Kids News & Activities";

/// Presentation settings shared by every page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Heading shown on every page.
    pub title: String,
    /// How many past editions the home page lists.
    pub home_archive_limit: usize,
    /// Prefix for links between pages. Always starts and ends with `/`.
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            home_archive_limit: DEFAULT_HOME_ARCHIVE_LIMIT,
            base_path: "/".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load a YAML site file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|err| ConfigError::Read {
            path: path.to_owned(),
            err,
        })?;
        let mut config: SiteConfig =
            serde_yaml::from_str(&raw).map_err(|err| ConfigError::Parse {
                path: path.to_owned(),
                err,
            })?;
        config.base_path = normalize_base_path(&config.base_path);
        info!(title = %config.title, home_archive_limit = config.home_archive_limit, base_path = %config.base_path, "Loaded site configuration");
        Ok(config)
    }

    /// Build the effective configuration: the file named by `--config` (or the
    /// defaults), with any flags given on the command line applied on top.
    pub async fn from_cli(args: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => SiteConfig::load(path).await?,
            None => SiteConfig::default(),
        };
        if let Some(limit) = args.archive_limit {
            config.home_archive_limit = limit;
        }
        if let Some(base_path) = &args.base_path {
            config.base_path = normalize_base_path(base_path);
        }
        if let Some(title) = &args.title {
            config.title = title.clone();
        }
        Ok(config)
    }

    /// Link to the home page.
    pub fn home_href(&self) -> &str {
        &self.base_path
    }

    /// Link to the page of the edition named `key`.
    pub fn edition_href(&self, key: &impl fmt::Display) -> String {
        format!("{}{}/", self.base_path, key)
    }
}

/// Force a leading and trailing `/`, so `news`, `/news` and `news/` all
/// become `/news/`, and the empty string becomes `/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// The error type for loading a site configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Returned when the file cannot be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the file is not valid YAML or has unknown keys.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, err } => {
                write!(f, "Reading config file '{}': {}", path.display(), err)
            }
            ConfigError::Parse { path, err } => {
                write!(f, "Parsing config file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { err, .. } => Some(err),
            ConfigError::Parse { err, .. } => Some(err),
        }
    }
}
