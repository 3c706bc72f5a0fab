//! Runtime configuration.
//!
//! Read from `$LISTING_SEARCH_CONFIG`, else `<config_dir>/listing-search/config.toml`.
//! A missing file means defaults; every field is optional.

use crate::error::ConfigError;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "LISTING_SEARCH_CONFIG";
pub const SOURCE_ENV: &str = "LISTING_SEARCH_SOURCE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Default listing file used when a request names no source.
    pub source: Option<PathBuf>,
    /// How long a loaded listing file stays fresh.
    pub cache_ttl_secs: u64,
    /// Number of distinct sources kept in memory.
    pub cache_capacity: usize,
    /// Results per search, capped at 12.
    pub max_results: usize,
    /// Inputs shorter than this close the suggestion dropdown instead of searching.
    pub min_query_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source: None,
            cache_ttl_secs: 20 * 60,
            cache_capacity: 16,
            max_results: crate::search::MAX_RESULTS,
            min_query_chars: 2,
        }
    }
}

impl SearchConfig {
    /// Loads the configuration from the default location, then applies
    /// `$LISTING_SEARCH_SOURCE`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        if let Ok(source) = std::env::var(SOURCE_ENV)
            && !source.trim().is_empty()
        {
            config.source = Some(PathBuf::from(source));
        }
        Ok(config)
    }

    /// Loads the configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// `$LISTING_SEARCH_CONFIG` if set, else the per-user config path.
fn default_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("listing-search").join("config.toml")))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        check!(config.cache_ttl() == Duration::from_secs(1200));
        check!(config.max_results == 12);
        check!(config.min_query_chars == 2);
        check!(config.source.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "source = \"/srv/listings.json\"\ncache_ttl_secs = 60").expect("write");

        let_assert!(Ok(config) = SearchConfig::from_file(file.path()));
        check!(config.source == Some(PathBuf::from("/srv/listings.json")));
        check!(config.cache_ttl() == Duration::from_secs(60));
        check!(config.cache_capacity == 16);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "sorce = \"typo.json\"").expect("write");

        let_assert!(Err(ConfigError::Parse { .. }) = SearchConfig::from_file(file.path()));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let_assert!(
            Err(ConfigError::Read { .. }) =
                SearchConfig::from_file(Path::new("/nonexistent/listing-search.toml"))
        );
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        check!(expand_tilde("/srv/listings.json") == "/srv/listings.json");
        check!(expand_tilde("listings.json") == "listings.json");
    }
}
