//! Travel durations between points, behind a time-of-day keyed cache.

mod cached;
mod driver;
mod error;
mod fixture;

pub use cached::{CachedRouteClient, DEFAULT_ROUTE_TTL_HOURS, ROUTE_NAMESPACE};
pub use driver::{RouteDriver, RouteDuration, directions_link, parse_duration_text};
pub use error::RouteError;
pub use fixture::FixtureRouteDriver;
