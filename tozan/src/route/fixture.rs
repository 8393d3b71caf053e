//! Route driver backed by a JSON file of known durations.
//!
//! The file maps coordinate-pair keys (see [`route_pair_key`]) to minutes,
//! or to the duration text a directions page shows:
//!
//! ```json
//! {
//!   "35.658581_139.745433_35.3606_138.7274": 150,
//!   "35.658581_139.745433_36.2893_137.6481": "3 時間 55 分"
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::cache::route_pair_key;
use crate::domain::GeoPoint;

use super::driver::{RouteDriver, RouteDuration, directions_link, parse_duration_text};
use super::error::RouteError;

/// One recorded duration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Recorded {
    Minutes(u32),
    Text(String),
}

/// Serves durations from a fixed table, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureRouteDriver {
    routes: HashMap<String, Recorded>,
}

impl FixtureRouteDriver {
    /// Load the table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RouteError::Fixture(format!("{}: {}", path.display(), e)))?;
        let routes: HashMap<String, Recorded> = serde_json::from_str(&json)
            .map_err(|e| RouteError::Fixture(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), routes = routes.len(), "loaded route fixture");
        Ok(Self { routes })
    }

    /// Add a route.
    pub fn insert(&mut self, origin: &GeoPoint, dest: &GeoPoint, minutes: u32) {
        self.routes
            .insert(route_pair_key(origin, dest), Recorded::Minutes(minutes));
    }

    /// Number of known routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are known.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteDriver for FixtureRouteDriver {
    type Session = ();

    async fn open_session(&self) -> Result<(), RouteError> {
        Ok(())
    }

    async fn compute_duration(
        &self,
        _session: &mut (),
        origin: &GeoPoint,
        dest: &GeoPoint,
    ) -> Result<RouteDuration, RouteError> {
        let recorded = self
            .routes
            .get(&route_pair_key(origin, dest))
            .ok_or_else(|| RouteError::NoRoute {
                from: origin.to_string(),
                to: dest.to_string(),
            })?;
        let minutes = match recorded {
            Recorded::Minutes(m) => *m,
            Recorded::Text(text) => parse_duration_text(text)
                .ok_or_else(|| RouteError::Driver(format!("unreadable duration {text:?}")))?,
        };

        Ok(RouteDuration {
            minutes,
            reference_link: directions_link(origin, dest),
        })
    }
}
