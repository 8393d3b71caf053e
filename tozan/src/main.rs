use std::collections::BTreeSet;
use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tozan::cache::StoreConfig;
use tozan::config::{AppConfig, Cli, Command, CommonArgs, CrawlArgs, SearchArgs, check_max_entries};
use tozan::directory::{ListingCrawler, TrailheadDirectory};
use tozan::domain::GeoPoint;
use tozan::filter::{
    climb_minutes_for, is_acceptable, load_name_set, parking_count, prefix_robust_match,
    resolve_working_set,
};
use tozan::route::{CachedRouteClient, FixtureRouteDriver, ROUTE_NAMESPACE};
use tozan::trailhead::{
    CachedTrailheadClient, HttpRecordSource, HttpSourceConfig, TRAILHEAD_NAMESPACE,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Search(args) => search(&cli.common, args).await,
        Command::Crawl(args) => crawl(&cli.common, args).await,
        Command::ClearCache => clear_cache(&cli.common),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn http_source(common: &CommonArgs) -> Result<HttpRecordSource, Box<dyn Error>> {
    Ok(HttpRecordSource::new(
        HttpSourceConfig::default().with_timeout(common.http_timeout),
    )?)
}

fn clear_cache(common: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let max_entries = check_max_entries(common.max_entries)?;
    let trailheads = CachedTrailheadClient::new(
        http_source(common)?,
        &StoreConfig::new(&common.cache_dir, TRAILHEAD_NAMESPACE).with_max_entries(max_entries),
    );
    let routes = CachedRouteClient::new(
        FixtureRouteDriver::default(),
        &StoreConfig::new(&common.cache_dir, ROUTE_NAMESPACE).with_max_entries(max_entries),
    );

    let removed = trailheads.invalidate_cache() + routes.invalidate_cache();
    info!(removed, "cleared cache");
    Ok(())
}

async fn crawl(common: &CommonArgs, args: &CrawlArgs) -> Result<(), Box<dyn Error>> {
    let urls = args.page_urls();
    if urls.is_empty() {
        return Err("no listing pages given".into());
    }

    let crawler = ListingCrawler::new(http_source(common)?).with_delay(args.delay());
    let directory = crawler.crawl(&urls).await?;
    info!(mountains = directory.len(), pages = urls.len(), "crawled listing pages");

    let json = serde_json::to_string_pretty(&directory)?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}

async fn search(common: &CommonArgs, args: &SearchArgs) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_args(common, args)?;

    let trailhead_store = StoreConfig::new(&config.cache_root, TRAILHEAD_NAMESPACE)
        .with_max_entries(config.max_entries);
    let route_store =
        StoreConfig::new(&config.cache_root, ROUTE_NAMESPACE).with_max_entries(config.max_entries);

    let trailheads = CachedTrailheadClient::new(http_source(common)?, &trailhead_store);
    let routes = match &config.route_fixture {
        Some(path) => Some(
            CachedRouteClient::new(FixtureRouteDriver::load(path)?, &route_store)
                .with_ttl(config.route_ttl),
        ),
        None => None,
    };

    let requested: BTreeSet<String> = args.mountains.iter().cloned().collect();
    let working = resolve_working_set(&requested, &config.exclude_files, &config.include_files);
    if working.is_empty() {
        return Err("no mountains given; see --help".into());
    }

    let directory = TrailheadDirectory::load(&config.directory_path)?;
    info!(mountains = directory.len(), "loaded trailhead directory");

    let excludes = load_name_set(&config.exclude_files);
    let mountains: Vec<&str> = directory
        .mountain_keys_for(&working)
        .into_iter()
        .filter(|m| !prefix_robust_match(&excludes, m))
        .collect();

    for mountain in mountains {
        let Some(entries) = directory.trailheads(mountain) else {
            continue;
        };

        let mut printed_header = false;
        for (trailhead, url) in entries.iter() {
            let record = match trailheads
                .get_trailhead_record(url, config.force_reload, config.cache_only)
                .await
            {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    warn!(mountain, trailhead, url, error = %e, "skipping trailhead");
                    continue;
                }
            };

            if !is_acceptable(mountain, &record, &config.criteria) {
                continue;
            }

            if config.names_only {
                println!("{mountain}");
                break;
            }
            if !printed_header {
                println!("{mountain}:");
                printed_header = true;
            }
            let climb = climb_minutes_for(mountain, &record);
            println!(
                "  {trailhead}  {url}  climb {}:{:02}  parking {}",
                climb / 60,
                climb % 60,
                parking_count(&record)
            );

            let (Some(routes), Some(dest)) = (
                routes.as_ref(),
                record.coordinates().and_then(|c| GeoPoint::parse_pair(c).ok()),
            ) else {
                continue;
            };
            match routes
                .get_route_duration(&config.origin, &dest, config.force_reload)
                .await
            {
                Ok(d) => println!(
                    "    drive {}:{:02}  {}",
                    d.minutes / 60,
                    d.minutes % 60,
                    d.reference_link
                ),
                Err(e) => warn!(mountain, trailhead, error = %e, "route lookup failed"),
            }
        }
    }

    Ok(())
}
