//! Cache-aside persistence.
//!
//! Trailhead facts and route durations are both cached on disk through the
//! same [`ExpiringStore`], each in its own namespace with its own TTL and
//! entry limit. Keys come from [`url_key`] and [`geo_key`].

mod error;
mod key;
mod store;

pub use error::CacheError;
pub use key::{file_stem, geo_key, route_pair_key, url_key};
pub use store::{ExpiringStore, StoreConfig, TIMESTAMP_FORMAT, Ttl};
