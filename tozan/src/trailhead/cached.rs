//! Cache-aside access to trailhead records.
//!
//! Raw records are stored exactly as fetched. Normalization happens on the
//! way out, so cache files always hold the page text and a change to
//! normalization never needs a refetch.

use tracing::{debug, info};

use crate::cache::{ExpiringStore, StoreConfig, Ttl, url_key};

use super::error::FetchError;
use super::record::Record;
use super::source::RecordSource;

/// Namespace for trailhead records.
pub const TRAILHEAD_NAMESPACE: &str = "tozanguchi";

/// A record source with a disk cache in front of it.
pub struct CachedTrailheadClient<S> {
    source: S,
    store: ExpiringStore<Record>,
    ttl: Ttl,
}

impl<S: RecordSource> CachedTrailheadClient<S> {
    /// Create a client. Trailhead pages rarely change, so entries never
    /// expire unless a TTL is set with [`with_ttl`](Self::with_ttl).
    pub fn new(source: S, config: &StoreConfig) -> Self {
        Self {
            source,
            store: ExpiringStore::new(config),
            ttl: Ttl::Infinite,
        }
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Get the normalized record for a trailhead page.
    ///
    /// * `force_reload` - treat any cached entry as stale
    /// * `cache_only` - never fetch; a miss returns `Ok(None)`
    ///
    /// A fetched record is written to the cache before it is returned.
    pub async fn get_trailhead_record(
        &self,
        url: &str,
        force_reload: bool,
        cache_only: bool,
    ) -> Result<Option<Record>, FetchError> {
        let key = url_key(url);

        if !force_reload
            && let Some(raw) = self.store.get(key, self.ttl)
        {
            debug!(url, key, "trailhead cache hit");
            return Ok(Some(raw.normalize()));
        }

        if cache_only {
            debug!(url, key, "trailhead cache miss in cache-only mode");
            return Ok(None);
        }

        info!(url, "fetching trailhead page");
        let raw = self.source.fetch(url).await?;
        self.store.put(key, &raw)?;

        Ok(Some(raw.normalize()))
    }

    /// Remove every cached trailhead record. Returns the number removed.
    pub fn invalidate_cache(&self) -> usize {
        self.store.invalidate_all()
    }

    /// Number of cached records.
    pub fn cache_entry_count(&self) -> usize {
        self.store.len()
    }

    /// Access the underlying source for uncached fetches.
    pub fn source(&self) -> &S {
        &self.source
    }
}
