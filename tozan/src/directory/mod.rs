//! The mountain → trailhead → URL directory.
//!
//! Built once at startup from a JSON file and passed by reference. Nothing
//! mutates it during a run. Mountains and trailheads keep the order of the
//! file, which is the order of the listing pages they were crawled from.
//!
//! ```json
//! { "富士山": { "富士宮口五合目": "https://example.com/trailhead/1" } }
//! ```

mod listing;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use listing::{
    DEFAULT_PAGE_DELAY, Link, ListingCrawler, ListingEntry, is_trailhead_link, paged_urls,
    parse_listing,
};

/// Errors from loading the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The file could not be read
    #[error("failed to read directory {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The file is not a valid directory document
    #[error("invalid directory {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Error returned when a directory document has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry {entry:?} must be {expected}")]
pub struct InvalidDirectory {
    entry: String,
    expected: &'static str,
}

/// Trailhead name → page URL for one mountain, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Trailheads {
    entries: Vec<(String, String)>,
}

impl Trailheads {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of one trailhead.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    /// Trailhead names and URLs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a trailhead, returning the name it was stored under.
    ///
    /// A repeated name with the same URL is a no-op; with a different URL the
    /// new entry gets a numeric suffix.
    pub fn insert_unique(&mut self, name: &str, url: &str) -> String {
        if self.get(name) == Some(url) {
            return name.to_string();
        }
        let key = unique_key(name, |k| self.get(k).is_some());
        self.entries.push((key.clone(), url.to_string()));
        key
    }
}

impl TryFrom<Map<String, Value>> for Trailheads {
    type Error = InvalidDirectory;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let entries = map
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(url) => Ok((name, url)),
                _ => Err(InvalidDirectory {
                    entry: name,
                    expected: "a URL string",
                }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

impl From<Trailheads> for Map<String, Value> {
    fn from(trailheads: Trailheads) -> Self {
        trailheads
            .entries
            .into_iter()
            .map(|(name, url)| (name, Value::String(url)))
            .collect()
    }
}

/// Immutable directory of mountains and their trailheads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TrailheadDirectory {
    mountains: Vec<(String, Trailheads)>,
}

impl TrailheadDirectory {
    /// Parse a directory from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a directory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| DirectoryError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Trailheads of one mountain.
    pub fn trailheads(&self, mountain: &str) -> Option<&Trailheads> {
        self.mountains
            .iter()
            .find(|(name, _)| name == mountain)
            .map(|(_, trailheads)| trailheads)
    }

    /// All mountain names, in file order.
    pub fn mountains(&self) -> impl Iterator<Item = &str> {
        self.mountains.iter().map(|(name, _)| name.as_str())
    }

    /// Mountains whose directory name starts with `query`.
    ///
    /// `富士山` finds `富士山` and `富士山_2`.
    pub fn mountain_keys(&self, query: &str) -> Vec<&str> {
        self.mountains()
            .filter(|name| name.starts_with(query))
            .collect()
    }

    /// Directory mountains matching any of the requested names, in file
    /// order and without repeats.
    pub fn mountain_keys_for<I, S>(&self, queries: I) -> Vec<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<S> = queries.into_iter().collect();
        self.mountains()
            .filter(|name| queries.iter().any(|q| name.starts_with(q.as_ref())))
            .collect()
    }

    /// Number of mountains.
    pub fn len(&self) -> usize {
        self.mountains.len()
    }

    /// Whether the directory has no mountains.
    pub fn is_empty(&self) -> bool {
        self.mountains.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for TrailheadDirectory {
    type Error = InvalidDirectory;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mountains = map
            .into_iter()
            .map(|(name, value)| match value {
                Value::Object(trailheads) => Ok((name, Trailheads::try_from(trailheads)?)),
                _ => Err(InvalidDirectory {
                    entry: name,
                    expected: "an object of trailheads",
                }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { mountains })
    }
}

impl From<TrailheadDirectory> for Map<String, Value> {
    fn from(directory: TrailheadDirectory) -> Self {
        directory
            .mountains
            .into_iter()
            .map(|(name, trailheads)| (name, Value::Object(trailheads.into())))
            .collect()
    }
}

/// Builder for assembling a directory from scraped listings.
///
/// Repeated names get a numeric suffix: a second `富士山` becomes `富士山_2`.
#[derive(Debug, Default)]
pub struct TrailheadDirectoryBuilder {
    inner: TrailheadDirectory,
}

impl TrailheadDirectoryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mountain with its trailheads. Returns the name it was stored under.
    pub fn add_mountain(&mut self, name: &str, trailheads: Trailheads) -> String {
        let key = unique_key(name, |k| self.inner.trailheads(k).is_some());
        self.inner.mountains.push((key.clone(), trailheads));
        key
    }

    /// Build the directory.
    pub fn build(self) -> TrailheadDirectory {
        self.inner
    }
}

/// `name`, or `name_N` with the smallest N ≥ 2 not yet taken.
fn unique_key(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}
