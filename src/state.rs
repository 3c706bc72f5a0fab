//! Shared state behind the server's tool handlers.

use crate::catalog::ListingCatalog;
use crate::config::SearchConfig;
use crate::error::VocabularyError;
use crate::search::SmartSearch;

/// The search engine, the listing catalog and the settings they were built from.
///
/// Built once at startup and shared through an `Arc`.
#[derive(Debug)]
pub struct SearchState {
    engine: SmartSearch,
    catalog: ListingCatalog,
    config: SearchConfig,
}

impl SearchState {
    pub fn new(config: SearchConfig) -> Result<Self, VocabularyError> {
        let engine = SmartSearch::new()?.with_limit(config.max_results);
        let catalog = ListingCatalog::new(&config);
        tracing::debug!(
            "Search state ready (limit {}, cache ttl {:?}, default source {:?})",
            engine.limit(),
            catalog.ttl(),
            config.source
        );
        Ok(Self {
            engine,
            catalog,
            config,
        })
    }

    pub const fn engine(&self) -> &SmartSearch {
        &self.engine
    }

    pub const fn catalog(&self) -> &ListingCatalog {
        &self.catalog
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }
}
