//! Command line and run configuration.
//!
//! [`Cli`] is the raw command line. Every option can also be given through a
//! `TOZAN_*` environment variable. [`AppConfig`] is the validated form the
//! search run works from.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::cache::Ttl;
use crate::directory::paged_urls;
use crate::domain::GeoPoint;
use crate::filter::{AcceptanceCriteria, parse_hhmm_to_minutes};

/// Default departure point (Tokyo Tower).
pub const DEFAULT_ORIGIN: &str = "35.658581 139.745433";

#[derive(Debug, Parser)]
#[command(
    name = "tozan",
    version,
    about = "Trailhead parking, climb times and drive times for mountains"
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Root directory of the cache namespaces
    #[arg(long, env = "TOZAN_CACHE_DIR", default_value = ".tozan_cache", global = true)]
    pub cache_dir: PathBuf,

    /// Entry limit per cache namespace
    #[arg(long, env = "TOZAN_MAX_ENTRIES", default_value_t = 1000, global = true)]
    pub max_entries: usize,

    /// HTTP request timeout in seconds
    #[arg(long, env = "TOZAN_HTTP_TIMEOUT", default_value_t = 30, global = true)]
    pub http_timeout: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the acceptable trailheads of mountains
    Search(SearchArgs),

    /// Build the trailhead directory from listing pages
    Crawl(CrawlArgs),

    /// Remove every cached entry
    ClearCache,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Mountain names such as 富士山
    pub mountains: Vec<String>,

    /// Mountain → trailhead → URL file
    #[arg(short, long, env = "TOZAN_DIRECTORY", default_value = "tozanguchi.json")]
    pub directory: PathBuf,

    /// Departure point as "lat lon"
    #[arg(short = 'f', long, env = "TOZAN_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Route durations file; drive times are skipped without one
    #[arg(long, env = "TOZAN_ROUTE_FIXTURE")]
    pub route_fixture: Option<PathBuf>,

    /// Route cache TTL in hours, or "infinite"
    #[arg(long, env = "TOZAN_ROUTE_TTL_HOURS", default_value = "24")]
    pub route_ttl_hours: String,

    /// Get the latest data even when it is cached
    #[arg(short, long, env = "TOZAN_RENEW")]
    pub renew: bool,

    /// Never fetch trailhead pages
    #[arg(long, env = "TOZAN_CACHE_ONLY")]
    pub cache_only: bool,

    /// Longest acceptable round trip, e.g. 5:00
    #[arg(short = 't', long, env = "TOZAN_MAX_TIME", default_value = "")]
    pub max_time: String,

    /// Shortest acceptable round trip, e.g. 4:30
    #[arg(short = 'b', long, env = "TOZAN_MIN_TIME", default_value = "")]
    pub min_time: String,

    /// Fewest acceptable parking spaces
    #[arg(short = 'p', long, env = "TOZAN_MIN_PARKING", default_value_t = 0)]
    pub min_parking: u32,

    /// Name list of mountains to skip, e.g. climbed.lst (repeatable)
    #[arg(short, long, env = "TOZAN_EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<PathBuf>,

    /// Name list of mountains to add (repeatable)
    #[arg(short, long, env = "TOZAN_INCLUDE", value_delimiter = ',')]
    pub include: Vec<PathBuf>,

    /// Print mountain names only
    #[arg(short, long)]
    pub names_only: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CrawlArgs {
    /// Listing page URLs, fetched in order
    pub urls: Vec<String>,

    /// Prefix of numbered listing pages, fetched after the plain URLs
    #[arg(long)]
    pub paged: Option<String>,

    /// First numbered page
    #[arg(long, default_value_t = 1)]
    pub first_page: u32,

    /// Last numbered page
    #[arg(long, default_value_t = 1)]
    pub last_page: u32,

    /// Pause between page requests in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Write the directory here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CrawlArgs {
    /// Every page to fetch, in order.
    pub fn page_urls(&self) -> Vec<String> {
        let mut urls = self.urls.clone();
        if let Some(prefix) = &self.paged {
            urls.extend(paged_urls(prefix, self.first_page, self.last_page));
        }
        urls
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Error returned for an unusable option value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid --{option} {value:?}: {message}")]
pub struct ConfigError {
    option: &'static str,
    value: String,
    message: String,
}

impl ConfigError {
    fn new(option: &'static str, value: impl ToString, message: impl ToString) -> Self {
        Self {
            option,
            value: value.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validated configuration for one search run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory of the cache namespaces.
    pub cache_root: PathBuf,
    /// Trailhead directory file.
    pub directory_path: PathBuf,
    /// Route fixture file, if route lookups are wanted.
    pub route_fixture: Option<PathBuf>,
    /// TTL for route durations.
    pub route_ttl: Ttl,
    /// Maximum entries per cache namespace.
    pub max_entries: usize,
    /// Departure point for route lookups.
    pub origin: GeoPoint,
    /// Trailhead acceptance limits.
    pub criteria: AcceptanceCriteria,
    /// Name lists whose mountains are skipped.
    pub exclude_files: Vec<PathBuf>,
    /// Name lists whose mountains are added.
    pub include_files: Vec<PathBuf>,
    /// Ignore cached entries.
    pub force_reload: bool,
    /// Never fetch trailhead pages.
    pub cache_only: bool,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Print mountain names only.
    pub names_only: bool,
}

impl AppConfig {
    /// Validate the search options.
    pub fn from_args(common: &CommonArgs, search: &SearchArgs) -> Result<Self, ConfigError> {
        let max_entries = check_max_entries(common.max_entries)?;
        let route_ttl = parse_ttl(&search.route_ttl_hours).map_err(|message| {
            ConfigError::new("route-ttl-hours", &search.route_ttl_hours, message)
        })?;
        let origin = GeoPoint::parse_pair(&search.origin)
            .map_err(|e| ConfigError::new("origin", &search.origin, e))?;
        let min_climb_minutes = parse_hhmm_to_minutes(&search.min_time)
            .map_err(|e| ConfigError::new("min-time", &search.min_time, e))?;
        let max_climb_minutes = parse_hhmm_to_minutes(&search.max_time)
            .map_err(|e| ConfigError::new("max-time", &search.max_time, e))?;

        Ok(Self {
            cache_root: common.cache_dir.clone(),
            directory_path: search.directory.clone(),
            route_fixture: search.route_fixture.clone(),
            route_ttl,
            max_entries,
            origin,
            criteria: AcceptanceCriteria::new(
                min_climb_minutes,
                max_climb_minutes,
                search.min_parking,
            ),
            exclude_files: search.exclude.clone(),
            include_files: search.include.clone(),
            force_reload: search.renew,
            cache_only: search.cache_only,
            http_timeout_secs: common.http_timeout,
            names_only: search.names_only,
        })
    }
}

/// A namespace must hold at least the entry just written.
pub fn check_max_entries(max_entries: usize) -> Result<usize, ConfigError> {
    if max_entries == 0 {
        return Err(ConfigError::new("max-entries", 0, "must be at least 1"));
    }
    Ok(max_entries)
}

fn parse_ttl(s: &str) -> Result<Ttl, &'static str> {
    match s.trim().to_ascii_lowercase().as_str() {
        "inf" | "infinite" | "never" => Ok(Ttl::Infinite),
        hours => {
            let hours: u64 = hours.parse().map_err(|_| "expected hours or \"infinite\"")?;
            Ttl::checked_hours(hours).ok_or("too many hours")
        }
    }
}
