//! Mountain name sets and prefix-robust matching.
//!
//! Names in user lists are often shorter or longer than directory keys
//! (`富士山` vs `富士山_2`, `大山` vs `大山（鳥取）`), so matching accepts a
//! prefix in either direction.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

/// Whether `query` and any candidate are prefixes of one another.
///
/// ```
/// use tozan::filter::prefix_robust_match;
///
/// assert!(prefix_robust_match(["Fuji"], "Fujisan"));
/// assert!(prefix_robust_match(["Fujisan"], "Fuji"));
/// assert!(!prefix_robust_match(["Takao"], "Fujisan"));
/// ```
pub fn prefix_robust_match<I, S>(candidates: I, query: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates.into_iter().any(|candidate| {
        let candidate = candidate.as_ref();
        query.starts_with(candidate) || candidate.starts_with(query)
    })
}

/// Read names from comma- or newline-separated list files.
///
/// Tokens are trimmed and stripped of quotes. Missing or unreadable files
/// contribute nothing.
pub fn load_name_set<P: AsRef<Path>>(files: &[P]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for file in files {
        let path = file.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => names.extend(parse_names(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "name list not found");
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to read name list"),
        }
    }
    names
}

/// Split list text into names.
pub fn parse_names(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .split([',', '\n', '\r'])
        .map(|token| token.trim().trim_matches(['"', '\'']).trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Combine requested names with include lists, then drop excluded names.
///
/// Exclusion uses [`prefix_robust_match`], so excluding `富士山` also drops
/// `富士山_2`.
pub fn resolve_working_set<P: AsRef<Path>>(
    requested: &BTreeSet<String>,
    exclude_files: &[P],
    include_files: &[P],
) -> BTreeSet<String> {
    let excludes = load_name_set(exclude_files);
    let includes = load_name_set(include_files);

    requested
        .iter()
        .chain(includes.iter())
        .filter(|name| !prefix_robust_match(&excludes, name))
        .cloned()
        .collect()
}
