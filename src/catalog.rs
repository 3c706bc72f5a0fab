//! Listing data source with a short-lived in-memory cache.
//!
//! Listing files are keyed by path, stamped with the time they were read, and
//! served from memory while fresh (20 minutes by default). Concurrent requests
//! for a source that is being loaded await the same shared future instead of
//! reading the file twice.

use crate::config::{SearchConfig, expand_tilde};
use crate::error::SourceError;
use crate::listing::{Listing, RawListing};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Keys under which an object-shaped listing file may hold its array.
const LISTING_KEYS: &[&str] = &["listings", "propiedades", "properties", "data"];

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<[Listing]>, SourceError>>>;

/// Loads in progress, plus a counter bumped by [`ListingCatalog::clear`] so a
/// load started before a clear never repopulates the cache.
#[derive(Default)]
struct InFlight {
    loads: HashMap<PathBuf, SharedLoad>,
    generation: u64,
}

/// Listings read from one source, with the time they were read.
#[derive(Debug, Clone)]
pub struct CachedListings {
    pub listings: Arc<[Listing]>,
    pub fetched_at: Instant,
}

impl CachedListings {
    /// Whether the entry is still fresh at `now` for the given TTL.
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Shared, cached access to listing files.
pub struct ListingCatalog {
    /// Loaded sources, least recently used evicted first
    cache: RwLock<LruCache<PathBuf, CachedListings>>,

    /// Loads in progress (can be awaited by multiple callers)
    in_flight: Mutex<InFlight>,

    ttl: Duration,

    /// Source used when a request names none
    default_source: Option<PathBuf>,
}

impl std::fmt::Debug for ListingCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingCatalog")
            .field("ttl", &self.ttl)
            .field("default_source", &self.default_source)
            .finish_non_exhaustive()
    }
}

impl ListingCatalog {
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_ttl(config.cache_ttl(), config.cache_capacity)
            .with_default_source(config.source.clone())
    }

    /// Creates a catalog with an explicit TTL and capacity and no default source.
    pub fn with_ttl(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            in_flight: Mutex::new(InFlight::default()),
            ttl,
            default_source: None,
        }
    }

    #[must_use]
    pub fn with_default_source(mut self, source: Option<PathBuf>) -> Self {
        self.default_source = source;
        self
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Picks the requested source, or the default one, expanding `~`.
    pub fn resolve_source(&self, requested: Option<&str>) -> Result<PathBuf, SourceError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(source) => Ok(PathBuf::from(expand_tilde(source).as_ref())),
            None => self
                .default_source
                .as_deref()
                .map(|path| PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref()))
                .ok_or(SourceError::Unconfigured),
        }
    }

    /// Returns the listings of a source, loading them if missing or stale.
    ///
    /// 1. Serves a fresh cache entry
    /// 2. Joins an in-flight load of the same source
    /// 3. Otherwise starts a new load and caches its result
    pub async fn get(&self, source: &Path) -> Result<Arc<[Listing]>, SourceError> {
        {
            let mut cache = self.cache.write().await;
            if let Some(entry) = cache.get(source) {
                if entry.is_fresh_at(Instant::now(), self.ttl) {
                    tracing::debug!("Cache hit for {}", source.display());
                    return Ok(entry.listings.clone());
                }
                tracing::debug!("Cache entry for {} is stale", source.display());
                cache.pop(source);
            }
        }

        // Checking for a running load and registering a new one happen under a
        // single lock, so concurrent misses share one read.
        let (shared, generation, started) = {
            let mut in_flight = self.in_flight.lock().await;
            let running = in_flight
                .loads
                .get(source)
                .filter(|load| load.peek().is_none())
                .cloned();
            match running {
                Some(running) => (running, in_flight.generation, false),
                None => {
                    let load: BoxFuture<'static, Result<Arc<[Listing]>, SourceError>> =
                        Box::pin(read_listings(source.to_path_buf()));
                    let shared = load.shared();
                    in_flight
                        .loads
                        .insert(source.to_path_buf(), shared.clone());
                    (shared, in_flight.generation, true)
                }
            }
        };

        if !started {
            tracing::debug!("Awaiting in-flight load of {}", source.display());
            return shared.await;
        }

        let result = shared.clone().await;
        self.finish_load(source, &shared, generation, &result).await;
        result
    }

    /// Unregisters a finished load and caches its listings, unless the catalog
    /// was cleared while it ran.
    async fn finish_load(
        &self,
        source: &Path,
        load: &SharedLoad,
        generation: u64,
        result: &Result<Arc<[Listing]>, SourceError>,
    ) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.generation != generation {
            tracing::debug!(
                "Catalog cleared while loading {}, not caching",
                source.display()
            );
            return;
        }
        if in_flight
            .loads
            .get(source)
            .is_some_and(|registered| registered.ptr_eq(load))
        {
            in_flight.loads.remove(source);
        }

        if let Ok(listings) = result {
            // Still holding `in_flight`: a concurrent clear waits for this insert.
            self.cache.write().await.put(
                source.to_path_buf(),
                CachedListings {
                    listings: listings.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
    }

    /// Whether a fresh entry exists for `source`.
    pub async fn is_cached(&self, source: &Path) -> bool {
        self.cache
            .read()
            .await
            .peek(source)
            .is_some_and(|entry| entry.is_fresh_at(Instant::now(), self.ttl))
    }

    /// Drops the cached entry for `source`.
    pub async fn invalidate(&self, source: &Path) {
        self.cache.write().await.pop(source);
    }

    /// Drops every cached entry. Loads still running finish for their callers
    /// but are not cached.
    pub async fn clear(&self) {
        {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.generation += 1;
            in_flight.loads.clear();
        }
        self.cache.write().await.clear();
    }
}

/// Reads and adapts a listing file.
pub async fn read_listings(path: PathBuf) -> Result<Arc<[Listing]>, SourceError> {
    let start = Instant::now();
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::NotFound { path });
        }
        Err(e) => {
            return Err(SourceError::Io {
                path,
                error: e.to_string(),
            });
        }
    };

    let listings = parse_listings(&path, &bytes)?;
    tracing::info!(
        "Loaded {} listings from {} in {:?}",
        listings.len(),
        path.display(),
        start.elapsed()
    );
    Ok(listings.into())
}

/// Parses a listing document: either an array of records or an object holding
/// one under a known key. Records that cannot be adapted are skipped.
pub fn parse_listings(path: &Path, bytes: &[u8]) -> Result<Vec<Listing>, SourceError> {
    let document: Value = serde_json::from_slice(bytes).map_err(|e| SourceError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut object) => LISTING_KEYS
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| SourceError::Parse {
                path: path.to_path_buf(),
                error: format!("expected an array under one of {:?}", LISTING_KEYS),
            })?,
        _ => {
            return Err(SourceError::Parse {
                path: path.to_path_buf(),
                error: "expected a JSON array of listings".to_string(),
            });
        }
    };

    let total = records.len();
    let listings: Vec<Listing> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let raw = match serde_json::from_value::<RawListing>(record) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Skipping listing #{} in {}: {}", position, path.display(), e);
                    return None;
                }
            };
            let listing = Listing::from_raw(raw);
            if listing.is_none() {
                tracing::warn!(
                    "Skipping listing #{} in {}: missing id",
                    position,
                    path.display()
                );
            }
            listing
        })
        .collect();

    if listings.len() < total {
        tracing::debug!(
            "Adapted {} of {} records from {}",
            listings.len(),
            total,
            path.display()
        );
    }

    Ok(listings)
}
