//! Trailhead finder.
//!
//! Looks up trailhead facts and travel times for mountains, caching both on
//! disk, and filters trailheads by climb time and parking capacity.

pub mod cache;
pub mod config;
pub mod directory;
pub mod domain;
pub mod filter;
pub mod route;
pub mod trailhead;
