//! Scraped trailhead facts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the main climbing routes.
pub const MAIN_ROUTES_FIELDS: [&str; 2] = ["主要登山ルート", "main climbing routes"];

/// Field holding the parking capacity.
pub const PARKING_FIELDS: [&str; 2] = ["駐車台数", "parking"];

/// Field holding the trailhead coordinates.
pub const COORDINATE_FIELDS: [&str; 2] = ["緯度経度", "coordinates"];

/// The value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// The value as text, if it is not a list.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }
}

/// Error returned when a stored record has a value that is neither a string
/// nor a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field:?} is not a string or list of strings")]
pub struct InvalidRecord {
    field: String,
}

/// Field/value facts for one trailhead, in page order.
///
/// Serializes as a JSON object whose key order follows the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get the first present field among `names`.
    pub fn get_any(&self, names: &[&str]) -> Option<&FieldValue> {
        names.iter().find_map(|name| self.get(name))
    }

    /// Iterate over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The main climbing routes, one entry per route.
    ///
    /// Empty if the field is missing.
    pub fn main_routes(&self) -> Vec<&str> {
        match self.get_any(&MAIN_ROUTES_FIELDS) {
            Some(FieldValue::List(routes)) => routes.iter().map(String::as_str).collect(),
            Some(FieldValue::Text(text)) => vec![text.as_str()],
            None => Vec::new(),
        }
    }

    /// The parking capacity text, if present.
    pub fn parking(&self) -> Option<&str> {
        self.get_any(&PARKING_FIELDS).and_then(FieldValue::as_text)
    }

    /// The coordinate text, if present.
    pub fn coordinates(&self) -> Option<&str> {
        self.get_any(&COORDINATE_FIELDS).and_then(FieldValue::as_text)
    }

    /// Split encoded multi-route text into a list.
    ///
    /// The routes field arrives as one string of entries, each closed by a
    /// parenthesis: `"A（往復時間：3時間）B（往復時間：5時間）"`. It becomes
    /// `["A（往復時間：3時間)", "B（往復時間：5時間)"]`. Other fields are
    /// untouched, and an already-split field is left alone, so normalizing
    /// twice is the same as normalizing once.
    pub fn normalize(mut self) -> Self {
        for (name, value) in &mut self.fields {
            if !MAIN_ROUTES_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if let FieldValue::Text(text) = value {
                *value = FieldValue::List(split_routes(text));
            }
        }
        self
    }
}

/// Split on closing parentheses, keeping one `)` on each non-empty entry.
///
/// A full-width `）` always ends a route. An ASCII `)` ends one only when
/// followed by whitespace or the end of the text, so `登山口(第1駐車場)～`
/// stays inside its route.
fn split_routes(text: &str) -> Vec<String> {
    let mut routes = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let closes = match c {
            '）' => true,
            ')' => chars.peek().is_none_or(|&(_, next)| next.is_whitespace()),
            _ => false,
        };
        if closes {
            push_route(&mut routes, &text[start..i]);
            start = i + c.len_utf8();
        }
    }
    push_route(&mut routes, &text[start..]);
    routes
}

fn push_route(routes: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        routes.push(format!("{fragment})"));
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, FieldValue::Text(v.into()));
        }
        record
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = InvalidRecord;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut record = Record::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => FieldValue::Text(s),
                Value::Array(items) => {
                    let items: Option<Vec<String>> = items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect();
                    match items {
                        Some(items) => FieldValue::List(items),
                        None => return Err(InvalidRecord { field: name }),
                    }
                }
                _ => return Err(InvalidRecord { field: name }),
            };
            record.insert(name, value);
        }
        Ok(record)
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record
            .fields
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::Text(s) => Value::String(s),
                    FieldValue::List(items) => {
                        Value::Array(items.into_iter().map(Value::String).collect())
                    }
                };
                (name, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_splits_routes() {
        let record: Record = [(
            "主要登山ルート",
            "登山口～山頂（往復時間：3時間20分）  登山口～尾根～山頂（往復時間：5時間）",
        )]
        .into_iter()
        .collect();

        let normalized = record.normalize();
        assert_eq!(
            normalized.main_routes(),
            vec![
                "登山口～山頂（往復時間：3時間20分)",
                "登山口～尾根～山頂（往復時間：5時間)"
            ]
        );
    }

    #[test]
    fn normalize_ascii_parens() {
        let record: Record = [(
            "main climbing routes",
            "TestMtn (round-trip time: 4 hour0 minute)",
        )]
        .into_iter()
        .collect();
        assert_eq!(
            record.normalize().main_routes(),
            vec!["TestMtn (round-trip time: 4 hour0 minute)"]
        );
    }

    #[test]
    fn normalize_keeps_inner_ascii_parens() {
        let record: Record = [(
            "主要登山ルート",
            "北岳登山口(第1駐車場)～北岳（往復時間：5時間） 夜叉神(P1)～観音岳 (round-trip time: 8 hour)",
        )]
        .into_iter()
        .collect();

        let normalized = record.normalize();
        assert_eq!(
            normalized.main_routes(),
            vec![
                "北岳登山口(第1駐車場)～北岳（往復時間：5時間)",
                "夜叉神(P1)～観音岳 (round-trip time: 8 hour)"
            ]
        );
        assert_eq!(crate::filter::climb_minutes_for("北岳", &normalized), 300);
        assert_eq!(crate::filter::climb_minutes_for("観音岳", &normalized), 480);
    }

    #[test]
    fn normalize_leaves_other_fields() {
        let record: Record = [("駐車台数", "20台（無料)"), ("トイレ", "あり")]
            .into_iter()
            .collect();
        assert_eq!(record.clone().normalize(), record);
    }

    #[test]
    fn normalize_is_idempotent_on_example() {
        let record: Record = [("主要登山ルート", "A（x）B（y）")].into_iter().collect();
        let once = record.normalize();
        assert_eq!(once.clone().normalize(), once);
    }

    #[test]
    fn insert_keeps_position() {
        let mut record: Record = [("a", "1"), ("b", "2")].into_iter().collect();
        record.insert("a", FieldValue::Text("3".into()));
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&FieldValue::Text("3".into())));
    }

    #[test]
    fn json_keeps_field_order() {
        let record: Record = [("z", "1"), ("a", "2")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn json_rejects_non_string_values() {
        assert!(serde_json::from_str::<Record>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"a": ["x", 2]}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"a": ["x", "y"]}"#).is_ok());
    }

    #[test]
    fn missing_fields_are_empty() {
        let record = Record::new();
        assert!(record.main_routes().is_empty());
        assert!(record.parking().is_none());
        assert!(record.coordinates().is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(MAIN_ROUTES_FIELDS[0].to_string()),
            Just(MAIN_ROUTES_FIELDS[1].to_string()),
            Just(PARKING_FIELDS[0].to_string()),
            "[a-z]{1,6}",
        ]
    }

    fn field_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            "[a-z )）（(]{0,30}".prop_map(FieldValue::Text),
            prop::collection::vec("[a-z )]{0,10}", 0..4).prop_map(FieldValue::List),
        ]
    }

    fn record() -> impl Strategy<Value = Record> {
        prop::collection::vec((field_name(), field_value()), 0..6).prop_map(|fields| {
            let mut record = Record::new();
            for (name, value) in fields {
                record.insert(name, value);
            }
            record
        })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(r in record()) {
            let once = r.normalize();
            prop_assert_eq!(once.clone().normalize(), once);
        }

        #[test]
        fn split_routes_end_with_paren(text in "[a-z )）（(]{0,30}") {
            let record: Record = [(MAIN_ROUTES_FIELDS[0], text)].into_iter().collect();
            for route in record.normalize().main_routes() {
                prop_assert!(route.ends_with(')'));
                prop_assert!(route.len() > 1);
            }
        }
    }
}
