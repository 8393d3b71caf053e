//! Domain types for trailhead lookup.
//!
//! Values here are validated at construction, so the cache and filter layers
//! can use them without re-checking.

mod geo;
mod mountain;
mod time_bucket;

pub use geo::{GeoPoint, InvalidGeoPoint};
pub use mountain::{MountainName, PEAK_SEPARATOR};
pub use time_bucket::{DayPart, TimeBucket};
