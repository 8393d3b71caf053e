//! Cache key derivation.
//!
//! Keys double as file stems, so they must be stable across runs and must not
//! escape the namespace directory.

use crate::domain::{GeoPoint, TimeBucket};

/// Separator between geo key fields.
const GEO_SEPARATOR: char = '_';

/// Key for a trailhead page: the last path segment of its URL.
///
/// Two URLs ending in the same segment share a key. Trailhead pages are
/// numbered under a single path, so this does not happen in practice.
///
/// ```
/// use tozan::cache::url_key;
///
/// assert_eq!(url_key("https://example.com/trailhead/trailhead123"), "trailhead123");
/// assert_eq!(url_key("trailhead123"), "trailhead123");
/// ```
pub fn url_key(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// Key for a route duration lookup.
///
/// Coordinates are used as written, so the key follows input identity rather
/// than geometric proximity.
///
/// ```
/// use chrono::NaiveDate;
/// use tozan::cache::geo_key;
/// use tozan::domain::{GeoPoint, TimeBucket};
///
/// let from = GeoPoint::parse("35.658581", "139.745433").unwrap();
/// let to = GeoPoint::parse("35.3606", "138.7274").unwrap();
/// let when = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(6, 0, 0).unwrap();
///
/// assert_eq!(
///     geo_key(&from, &to, TimeBucket::at(when)),
///     "35.658581_139.745433_35.3606_138.7274_morning"
/// );
/// ```
pub fn geo_key(origin: &GeoPoint, dest: &GeoPoint, bucket: TimeBucket) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}{sep}{}",
        origin.lat(),
        origin.lon(),
        dest.lat(),
        dest.lon(),
        bucket,
        sep = GEO_SEPARATOR
    )
}

/// Key for a route lookup without the time bucket.
///
/// Used by fixture files, which hold one duration per coordinate pair.
pub fn route_pair_key(origin: &GeoPoint, dest: &GeoPoint) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}",
        origin.lat(),
        origin.lon(),
        dest.lat(),
        dest.lon(),
        sep = GEO_SEPARATOR
    )
}

/// Turn a key into a file stem that stays inside the cache directory.
///
/// Characters that are unsafe in file names become `_`. Already-safe keys are
/// returned unchanged, so file names of existing cache directories still match.
pub fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        format!("_{stem}")
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DayPart;

    fn point(lat: &str, lon: &str) -> GeoPoint {
        GeoPoint::parse(lat, lon).unwrap()
    }

    #[test]
    fn url_key_trailing_slash_is_empty() {
        assert_eq!(url_key("https://example.com/trailhead/"), "");
    }

    #[test]
    fn url_key_keeps_query() {
        assert_eq!(url_key("https://example.com/th?id=3"), "th?id=3");
    }

    #[test]
    fn url_keys_collide_on_same_tail() {
        assert_eq!(url_key("http://a/x/42"), url_key("http://b/y/42"));
    }

    #[test]
    fn geo_key_differs_by_bucket() {
        let a = point("35.0", "139.0");
        let b = point("36.0", "138.0");
        let weekday = geo_key(&a, &b, TimeBucket::new(DayPart::Lunch, false));
        let weekend = geo_key(&a, &b, TimeBucket::new(DayPart::Lunch, true));
        let evening = geo_key(&a, &b, TimeBucket::new(DayPart::Evening, false));
        assert_ne!(weekday, weekend);
        assert_ne!(weekday, evening);
        assert_eq!(weekday, "35.0_139.0_36.0_138.0_lunch");
        assert_eq!(weekend, "35.0_139.0_36.0_138.0_weekend_lunch");
    }

    #[test]
    fn route_pair_key_is_geo_key_prefix() {
        let a = point("35.0", "139.0");
        let b = point("36.0", "138.0");
        let bucket = TimeBucket::new(DayPart::Night, false);
        assert!(geo_key(&a, &b, bucket).starts_with(&route_pair_key(&a, &b)));
    }

    #[test]
    fn file_stem_replaces_separators() {
        assert_eq!(file_stem("th?id=3"), "th_id=3");
        assert_eq!(file_stem("../etc/passwd"), ".._etc_passwd");
        assert_eq!(file_stem(".."), "_..");
        assert_eq!(file_stem(""), "_");
    }

    #[test]
    fn file_stem_leaves_geo_keys_alone() {
        let key = "35.658581_139.745433_35.3606_138.7274_weekend_lunch";
        assert_eq!(file_stem(key), key);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::DayPart;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = String> {
        (-89i32..89, 0u32..1_000_000).prop_map(|(whole, frac)| format!("{whole}.{frac}"))
    }

    fn bucket() -> impl Strategy<Value = TimeBucket> {
        (0usize..DayPart::ALL.len(), any::<bool>())
            .prop_map(|(i, weekend)| TimeBucket::new(DayPart::ALL[i], weekend))
    }

    proptest! {
        #[test]
        fn geo_key_is_injective(
            a in (coord(), coord(), coord(), coord(), bucket()),
            b in (coord(), coord(), coord(), coord(), bucket()),
        ) {
            let key = |t: &(String, String, String, String, TimeBucket)| {
                let o = GeoPoint::parse(&t.0, &t.1).unwrap();
                let d = GeoPoint::parse(&t.2, &t.3).unwrap();
                geo_key(&o, &d, t.4)
            };
            prop_assert_eq!(a == b, key(&a) == key(&b));
        }

        #[test]
        fn file_stem_has_no_separators(key in ".*") {
            let stem = file_stem(&key);
            prop_assert!(!stem.contains('/'));
            prop_assert!(!stem.contains('\\'));
            prop_assert!(!stem.is_empty());
        }
    }
}
