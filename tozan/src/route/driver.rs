//! Route duration drivers.
//!
//! A driver computes how long it takes to get from one point to another,
//! typically by operating a map site. Drivers are slow, so they work within a
//! session that is opened once and reused for every lookup in a run.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

use super::error::RouteError;

/// Travel time between two points, with a link to the directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDuration {
    pub minutes: u32,
    pub reference_link: String,
}

/// Something that can compute travel durations.
pub trait RouteDriver {
    /// State kept between lookups, such as an open browser.
    type Session: Send;

    /// Start a session.
    fn open_session(&self) -> impl Future<Output = Result<Self::Session, RouteError>> + Send;

    /// Compute the duration from `origin` to `dest`.
    fn compute_duration(
        &self,
        session: &mut Self::Session,
        origin: &GeoPoint,
        dest: &GeoPoint,
    ) -> impl Future<Output = Result<RouteDuration, RouteError>> + Send;
}

/// A shareable Google Maps directions link.
///
/// ```
/// use tozan::domain::GeoPoint;
/// use tozan::route::directions_link;
///
/// let from = GeoPoint::parse("35.658581", "139.745433").unwrap();
/// let to = GeoPoint::parse("35.3606", "138.7274").unwrap();
/// assert_eq!(
///     directions_link(&from, &to),
///     "https://www.google.com/maps/dir/35.658581,139.745433/35.3606,138.7274"
/// );
/// ```
pub fn directions_link(origin: &GeoPoint, dest: &GeoPoint) -> String {
    format!("https://www.google.com/maps/dir/{origin}/{dest}")
}

/// Parse a duration as displayed by a map site into minutes.
///
/// Understands Japanese and English units: `"1 時間 25 分"`, `"2時間5分"`,
/// `"1 hr 5 min"`, `"45 mins"`, `"1 day 2 hours"`. Returns `None` if no
/// number with a known unit is found.
///
/// ```
/// use tozan::route::parse_duration_text;
///
/// assert_eq!(parse_duration_text("1 時間 25 分"), Some(85));
/// assert_eq!(parse_duration_text("2 hr 5 min"), Some(125));
/// assert_eq!(parse_duration_text("unknown"), None);
/// ```
pub fn parse_duration_text(text: &str) -> Option<u32> {
    let mut total: Option<u32> = None;
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            chars.next();
            continue;
        }

        let mut value: u32 = 0;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d);
            chars.next();
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut unit = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() || c.is_whitespace() {
                break;
            }
            unit.push(c);
            chars.next();
        }

        let scale = match unit.to_lowercase() {
            u if u.starts_with('日') || u.starts_with('d') => 24 * 60,
            u if u.starts_with('時') || u.starts_with('h') => 60,
            u if u.starts_with('分') || u.starts_with('m') => 1,
            _ => continue,
        };
        total = Some(total.unwrap_or(0).saturating_add(value.saturating_mul(scale)));
    }
    total
}
