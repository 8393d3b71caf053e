//! Coarse time-of-day partitions for travel-time caching.
//!
//! Driving times depend on traffic, so route durations are cached per part of
//! the day rather than per exact minute. The partition is half-open: a query at
//! exactly 05:00 belongs to `morning`, not `early_morning`.

use std::fmt;

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};

/// A named part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayPart {
    EarlyMorning,
    Morning,
    LateMorning,
    Lunch,
    LateLunch,
    Afternoon,
    Evening,
    Night,
    Midnight,
}

impl DayPart {
    /// All parts, in the order they occur from 03:00.
    pub const ALL: [DayPart; 9] = [
        DayPart::EarlyMorning,
        DayPart::Morning,
        DayPart::LateMorning,
        DayPart::Lunch,
        DayPart::LateLunch,
        DayPart::Afternoon,
        DayPart::Evening,
        DayPart::Night,
        DayPart::Midnight,
    ];

    /// Map minutes from midnight (0..1440) to a part of the day.
    pub fn from_minutes(mins: u32) -> Self {
        match mins % 1440 {
            180..300 => DayPart::EarlyMorning,
            300..480 => DayPart::Morning,
            480..600 => DayPart::LateMorning,
            600..780 => DayPart::Lunch,
            780..900 => DayPart::LateLunch,
            900..1080 => DayPart::Afternoon,
            1080..1200 => DayPart::Evening,
            1200..1320 => DayPart::Night,
            _ => DayPart::Midnight,
        }
    }

    /// The tag used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::EarlyMorning => "early_morning",
            DayPart::Morning => "morning",
            DayPart::LateMorning => "late_morning",
            DayPart::Lunch => "lunch",
            DayPart::LateLunch => "late_lunch",
            DayPart::Afternoon => "afternoon",
            DayPart::Evening => "evening",
            DayPart::Night => "night",
            DayPart::Midnight => "midnight",
        }
    }
}

/// A part of the day plus whether it falls on a weekend.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tozan::domain::TimeBucket;
///
/// // Friday 2024-03-15, 12:30
/// let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(12, 30, 0).unwrap();
/// assert_eq!(TimeBucket::at(friday).to_string(), "lunch");
///
/// // Saturday 2024-03-16, 12:30
/// let saturday = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap().and_hms_opt(12, 30, 0).unwrap();
/// assert_eq!(TimeBucket::at(saturday).to_string(), "weekend_lunch");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    part: DayPart,
    weekend: bool,
}

impl TimeBucket {
    /// Create a bucket from its components.
    pub fn new(part: DayPart, weekend: bool) -> Self {
        Self { part, weekend }
    }

    /// The bucket containing the given local wall-clock time.
    pub fn at(now: NaiveDateTime) -> Self {
        let mins = now.hour() * 60 + now.minute();
        let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
        Self::new(DayPart::from_minutes(mins), weekend)
    }

    /// The bucket for the current local time.
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    /// Returns the part of the day.
    pub fn part(&self) -> DayPart {
        self.part
    }

    /// Returns true for Saturday and Sunday.
    pub fn is_weekend(&self) -> bool {
        self.weekend
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weekend {
            f.write_str("weekend_")?;
        }
        f.write_str(self.part.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Within a part of the day, the bucket never changes.
        #[test]
        fn bucket_is_constant_within_part(a in 0u32..1440, b in 0u32..1440) {
            let pa = DayPart::from_minutes(a);
            let pb = DayPart::from_minutes(b);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // Walking from lo to hi without leaving the part means same part.
            if (lo..=hi).all(|m| DayPart::from_minutes(m) == pa) {
                prop_assert_eq!(pa, pb);
            }
        }

        /// Tags of distinct buckets never collide.
        #[test]
        fn distinct_buckets_have_distinct_tags(
            i in 0usize..9, j in 0usize..9, wi in any::<bool>(), wj in any::<bool>()
        ) {
            let a = TimeBucket::new(DayPart::ALL[i], wi);
            let b = TimeBucket::new(DayPart::ALL[j], wj);
            prop_assert_eq!(a == b, a.to_string() == b.to_string());
        }
    }
}
