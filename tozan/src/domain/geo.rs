//! Geographic points carried as their original decimal strings.

use std::fmt;

/// Error returned when parsing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {input:?}: {reason}")]
pub struct InvalidGeoPoint {
    input: String,
    reason: &'static str,
}

impl InvalidGeoPoint {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A latitude/longitude pair.
///
/// The original decimal text is kept verbatim so that cache keys derived from
/// a point match the caller's input exactly. `35.6586` and `35.65860` are
/// different points as far as the cache is concerned.
///
/// # Examples
///
/// ```
/// use tozan::domain::GeoPoint;
///
/// let tokyo_tower = GeoPoint::parse("35.658581", "139.745433").unwrap();
/// assert_eq!(tokyo_tower.lat(), "35.658581");
///
/// assert!(GeoPoint::parse("91.0", "139.0").is_err());
/// assert!(GeoPoint::parse("north", "139.0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoPoint {
    lat: String,
    lon: String,
}

impl GeoPoint {
    /// Parse a point from latitude and longitude strings.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, InvalidGeoPoint> {
        let lat = lat.trim();
        let lon = lon.trim();
        check_component(lat, 90.0)?;
        check_component(lon, 180.0)?;
        Ok(Self {
            lat: lat.to_string(),
            lon: lon.to_string(),
        })
    }

    /// Parse a whitespace- or comma-separated `"lat lon"` pair.
    ///
    /// ```
    /// use tozan::domain::GeoPoint;
    ///
    /// let p = GeoPoint::parse_pair("35.658581 139.745433").unwrap();
    /// assert_eq!(p.lon(), "139.745433");
    /// let q = GeoPoint::parse_pair("35.658581,139.745433").unwrap();
    /// assert_eq!(p, q);
    /// ```
    pub fn parse_pair(s: &str) -> Result<Self, InvalidGeoPoint> {
        let mut parts = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty());
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(InvalidGeoPoint::new(s, "expected \"<lat> <lon>\""));
        };
        Self::parse(lat, lon)
    }

    /// Latitude as originally written.
    pub fn lat(&self) -> &str {
        &self.lat
    }

    /// Longitude as originally written.
    pub fn lon(&self) -> &str {
        &self.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

fn check_component(s: &str, limit: f64) -> Result<(), InvalidGeoPoint> {
    if s.is_empty() {
        return Err(InvalidGeoPoint::new(s, "empty"));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        return Err(InvalidGeoPoint::new(s, "not a decimal number"));
    }
    let value: f64 = s
        .parse()
        .map_err(|_| InvalidGeoPoint::new(s, "not a decimal number"))?;
    if value.abs() > limit {
        return Err(InvalidGeoPoint::new(s, "out of range"));
    }
    Ok(())
}
