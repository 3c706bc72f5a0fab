//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for listing-search glue code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` in the binary and configuration loading.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a synonym table cannot be turned into a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    /// Two canonical tags declare variants that normalize to the same string.
    #[error(
        "{vocabulary} vocabulary: variant '{variant}' maps to both '{first}' and '{second}'"
    )]
    OverlappingVariant {
        vocabulary: &'static str,
        variant: String,
        first: String,
        second: String,
    },
    /// A tag or variant normalizes to the empty string.
    #[error("{vocabulary} vocabulary: variant '{raw}' of '{tag}' is empty after normalization")]
    EmptyVariant {
        vocabulary: &'static str,
        tag: String,
        raw: String,
    },
}

/// Error returned when loading a listing source fails.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// No source was given and none is configured.
    #[error("no listing source configured")]
    Unconfigured,
    /// The listing file does not exist.
    #[error("listing source not found at {}", path.display())]
    NotFound { path: PathBuf },
    /// The listing file could not be read.
    #[error("failed to read listings from {}: {error}", path.display())]
    Io { path: PathBuf, error: String },
    /// The listing file is not valid listing JSON.
    #[error("failed to parse listings from {}: {error}", path.display())]
    Parse { path: PathBuf, error: String },
}

/// Error returned when the configuration file cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
