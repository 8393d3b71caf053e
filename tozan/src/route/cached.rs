//! Cache-aside access to route durations.
//!
//! Durations are keyed by both endpoints and the current [`TimeBucket`], so a
//! morning estimate and an evening estimate for the same trip are separate
//! entries. The driver session is opened on the first miss and kept for the
//! lifetime of the client.

use chrono::{Local, NaiveDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{ExpiringStore, StoreConfig, Ttl, geo_key};
use crate::domain::{GeoPoint, TimeBucket};

use super::driver::{RouteDriver, RouteDuration};
use super::error::RouteError;

/// Namespace for route durations.
pub const ROUTE_NAMESPACE: &str = "route_time";

/// Default TTL for route durations.
pub const DEFAULT_ROUTE_TTL_HOURS: u64 = 24;

/// A route driver with a disk cache in front of it.
pub struct CachedRouteClient<D: RouteDriver> {
    driver: D,
    session: Mutex<Option<D::Session>>,
    store: ExpiringStore<RouteDuration>,
    ttl: Ttl,
}

impl<D: RouteDriver> CachedRouteClient<D> {
    /// Create a client with the default TTL.
    pub fn new(driver: D, config: &StoreConfig) -> Self {
        Self {
            driver,
            session: Mutex::new(None),
            store: ExpiringStore::new(config),
            ttl: Ttl::hours(DEFAULT_ROUTE_TTL_HOURS),
        }
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Get the travel duration from `origin` to `dest` for the current time
    /// of day.
    pub async fn get_route_duration(
        &self,
        origin: &GeoPoint,
        dest: &GeoPoint,
        force_reload: bool,
    ) -> Result<RouteDuration, RouteError> {
        self.get_route_duration_at(origin, dest, force_reload, Local::now().naive_local())
            .await
    }

    /// Get the travel duration as of `now`.
    ///
    /// The driver is called only on a miss, and its result is cached before
    /// being returned.
    pub async fn get_route_duration_at(
        &self,
        origin: &GeoPoint,
        dest: &GeoPoint,
        force_reload: bool,
        now: NaiveDateTime,
    ) -> Result<RouteDuration, RouteError> {
        let key = geo_key(origin, dest, TimeBucket::at(now));

        if !force_reload
            && let Some(cached) = self.store.get_at(&key, self.ttl, now)
        {
            debug!(key = %key, "route cache hit");
            return Ok(cached);
        }

        let mut guard = self.session.lock().await;
        if guard.is_none() {
            info!("opening route session");
            *guard = Some(self.driver.open_session().await?);
        }
        let Some(session) = guard.as_mut() else {
            return Err(RouteError::Session("session unavailable".to_string()));
        };

        info!(%origin, %dest, "computing route duration");
        let duration = self.driver.compute_duration(session, origin, dest).await?;
        self.store.put_at(&key, &duration, now)?;

        Ok(duration)
    }

    /// Remove every cached duration. Returns the number removed.
    pub fn invalidate_cache(&self) -> usize {
        self.store.invalidate_all()
    }

    /// Access the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
