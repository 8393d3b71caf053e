//! Trailhead acceptance: climb time windows and parking capacity.

use tracing::trace;

use crate::domain::MountainName;
use crate::trailhead::Record;

/// Markers that introduce the round-trip time inside a route description.
const ROUND_TRIP_MARKERS: [&str; 4] = ["round-trip time:", "往復時間：", "往復時間:", "往復時間"];

/// Hour units, longest first so `hours` is not read as `h` + `ours`.
const HOUR_UNITS: [&str; 5] = ["時間", "hours", "hour", "hr", "h"];

/// Minute units, longest first.
const MINUTE_UNITS: [&str; 5] = ["分", "minutes", "minute", "min", "m"];

/// Error returned when parsing an invalid `H:MM` duration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct InvalidDuration {
    input: String,
    reason: &'static str,
}

impl InvalidDuration {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a user-supplied duration into minutes.
///
/// ```
/// use tozan::filter::parse_hhmm_to_minutes;
///
/// assert_eq!(parse_hhmm_to_minutes("4:30"), Ok(270));
/// assert_eq!(parse_hhmm_to_minutes(""), Ok(0));
/// assert_eq!(parse_hhmm_to_minutes("90"), Ok(90));
/// assert!(parse_hhmm_to_minutes("4:75").is_err());
/// ```
pub fn parse_hhmm_to_minutes(text: &str) -> Result<u32, InvalidDuration> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let parse = |s: &str| -> Result<u32, InvalidDuration> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDuration::new(text, "expected digits"));
        }
        s.parse()
            .map_err(|_| InvalidDuration::new(text, "number too large"))
    };

    match text.split_once(':') {
        Some((hours, minutes)) => {
            let hours = parse(hours)?;
            let minutes = parse(minutes)?;
            if minutes > 59 {
                return Err(InvalidDuration::new(text, "minutes must be 0-59"));
            }
            hours
                .checked_mul(60)
                .and_then(|h| h.checked_add(minutes))
                .ok_or_else(|| InvalidDuration::new(text, "number too large"))
        }
        None => parse(text),
    }
}

/// The first run of ASCII digits in `text`, or 0.
///
/// ```
/// use tozan::filter::extract_minutes;
///
/// assert_eq!(extract_minutes("約20台（無料）"), 20);
/// assert_eq!(extract_minutes("なし"), 0);
/// ```
pub fn extract_minutes(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Round-trip climb time in minutes for a mountain, or 0 if unknown.
///
/// Takes the first route mentioning any of the mountain's peaks and reads its
/// round-trip phrase, e.g. `Fuji (round-trip time: 5 hour30 minute)` → 330.
pub fn climb_minutes_for(mountain: &str, record: &Record) -> u32 {
    let names = MountainName::components(mountain);
    let Some(route) = record
        .main_routes()
        .into_iter()
        .find(|route| names.iter().any(|name| route.contains(name)))
    else {
        trace!(mountain, "no route mentions this mountain");
        return 0;
    };
    parse_round_trip(route).unwrap_or(0)
}

/// Parse `<marker> <H hour>?<M minute>` from a route description.
fn parse_round_trip(route: &str) -> Option<u32> {
    let rest = ROUND_TRIP_MARKERS
        .iter()
        .find_map(|marker| route.find(marker).map(|i| &route[i + marker.len()..]))?;

    let (first, rest) = take_number(rest)?;
    if let Some(rest) = strip_unit(rest, &HOUR_UNITS) {
        let minutes = take_number(rest)
            .and_then(|(m, rest)| strip_unit(rest, &MINUTE_UNITS).map(|_| m))
            .unwrap_or(0);
        return first.checked_mul(60)?.checked_add(minutes);
    }
    strip_unit(rest, &MINUTE_UNITS).map(|_| first)
}

/// Read a leading number, skipping whitespace.
fn take_number(s: &str) -> Option<(u32, &str)> {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((s[..end].parse().ok()?, &s[end..]))
}

/// Strip a leading unit, skipping whitespace.
fn strip_unit<'a>(s: &'a str, units: &[&str]) -> Option<&'a str> {
    let s = s.trim_start();
    units.iter().find_map(|unit| s.strip_prefix(unit))
}

/// Limits a trailhead must satisfy. Zero means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceCriteria {
    /// Shortest acceptable round trip (minutes).
    pub min_climb_minutes: u32,
    /// Longest acceptable round trip (minutes).
    pub max_climb_minutes: u32,
    /// Fewest acceptable parking spaces.
    pub min_parking: u32,
}

impl AcceptanceCriteria {
    /// Create criteria with the given limits.
    pub fn new(min_climb_minutes: u32, max_climb_minutes: u32, min_parking: u32) -> Self {
        Self {
            min_climb_minutes,
            max_climb_minutes,
            min_parking,
        }
    }

    /// Whether a climb of `minutes` is inside the window.
    pub fn accepts_climb(&self, minutes: u32) -> bool {
        (self.min_climb_minutes == 0 || minutes >= self.min_climb_minutes)
            && (self.max_climb_minutes == 0 || minutes <= self.max_climb_minutes)
    }

    /// Whether `spaces` parking spaces are enough.
    pub fn accepts_parking(&self, spaces: u32) -> bool {
        spaces >= self.min_parking
    }
}

/// Parking spaces listed in a record, or 0.
pub fn parking_count(record: &Record) -> u32 {
    record.parking().map(extract_minutes).unwrap_or(0)
}

/// Whether a trailhead's record satisfies `criteria` for `mountain`.
///
/// Missing fields count as 0 and never fail the check by themselves.
pub fn is_acceptable(mountain: &str, record: &Record, criteria: &AcceptanceCriteria) -> bool {
    let climb = climb_minutes_for(mountain, record);
    let parking = parking_count(record);
    let accepted = criteria.accepts_climb(climb) && criteria.accepts_parking(parking);
    trace!(mountain, climb, parking, accepted, "evaluated trailhead");
    accepted
}
