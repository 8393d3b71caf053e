//! Directory → cached fetch → normalize → acceptance, with stubbed upstreams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::tempdir;

use tozan::cache::{ExpiringStore, StoreConfig, Ttl};
use tozan::directory::{ListingCrawler, TrailheadDirectory};
use tozan::domain::GeoPoint;
use tozan::filter::{AcceptanceCriteria, climb_minutes_for, is_acceptable, parking_count};
use tozan::route::{CachedRouteClient, FixtureRouteDriver, ROUTE_NAMESPACE};
use tozan::trailhead::{
    CachedTrailheadClient, FetchError, PageSource, Record, RecordSource, TRAILHEAD_NAMESPACE,
    extract_record,
};

struct StubSource {
    calls: AtomicUsize,
}

impl RecordSource for StubSource {
    async fn fetch(&self, _url: &str) -> Result<Record, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([(
            "main climbing routes",
            "TestMtn (round-trip time: 4 hour0 minute)",
        )]
        .into_iter()
        .collect())
    }
}

#[tokio::test]
async fn acceptance_over_cached_records() {
    let dir = tempdir().unwrap();
    let directory =
        TrailheadDirectory::from_json(r#"{"TestMtn": {"GateA": "http://x/1"}}"#).unwrap();
    let client = CachedTrailheadClient::new(
        StubSource {
            calls: AtomicUsize::new(0),
        },
        &StoreConfig::new(dir.path(), TRAILHEAD_NAMESPACE),
    );

    let url = directory
        .trailheads("TestMtn")
        .and_then(|t| t.get("GateA"))
        .unwrap();
    let record = client
        .get_trailhead_record(url, false, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(climb_minutes_for("TestMtn", &record), 240);
    assert!(is_acceptable(
        "TestMtn",
        &record,
        &AcceptanceCriteria::new(200, 300, 0)
    ));
    assert!(!is_acceptable(
        "TestMtn",
        &record,
        &AcceptanceCriteria::new(200, 200, 0)
    ));

    // Second run over the same cache never touches the source.
    let again = client
        .get_trailhead_record(url, false, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again, record);
    assert_eq!(client.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn route_durations_from_fixture() {
    let dir = tempdir().unwrap();
    let from = GeoPoint::parse("35.658581", "139.745433").unwrap();
    let to = GeoPoint::parse("35.3606", "138.7274").unwrap();

    let mut driver = FixtureRouteDriver::default();
    driver.insert(&from, &to, 150);
    let client = CachedRouteClient::new(driver, &StoreConfig::new(dir.path(), ROUTE_NAMESPACE));

    let now = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    let d = client
        .get_route_duration_at(&from, &to, false, now)
        .await
        .unwrap();
    assert_eq!(d.minutes, 150);
    assert!(d.reference_link.contains("35.658581,139.745433"));

    let missing = client.get_route_duration_at(&to, &from, false, now).await;
    assert!(missing.is_err());
}

#[test]
fn eviction_keeps_newest_entries() {
    let dir = tempdir().unwrap();
    let max_entries = 4;
    let extra = 3;
    let store: ExpiringStore<u32> =
        ExpiringStore::new(&StoreConfig::new(dir.path(), "evict").with_max_entries(max_entries));

    let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    for i in 0..(max_entries + extra) {
        let at = t0 + chrono::Duration::seconds(i as i64);
        store.put_at(&format!("key{i}"), &(i as u32), at).unwrap();
    }

    assert_eq!(store.len(), max_entries);
    for i in 0..extra {
        assert!(store.get(&format!("key{i}"), Ttl::Infinite).is_none());
    }
    for i in extra..(max_entries + extra) {
        assert_eq!(store.get(&format!("key{i}"), Ttl::Infinite), Some(i as u32));
    }
}

const LISTING: &str = r#"
    <article>
      <h3>甲斐駒ヶ岳（山梨県・長野県）</h3>
      <p class="th_data">
        <a href="http://x/trailhead/trailhead-2">竹宇駒ヶ岳神社</a>
        <a href="http://x/trailhead/trailhead-1">北沢峠</a>
      </p>
    </article>
"#;

const TRAILHEAD_PAGE: &str = r#"
    <dl>
      <dt>登山口</dt><dd>竹宇駒ヶ岳神社</dd>
      <dt>駐車台数</dt><dd>約50台</dd><dt>備考</dt>
      <dt>主要登山ルート</dt><dd>竹宇駒ヶ岳神社～甲斐駒ヶ岳（往復時間：11時間30分）</dd><dt>備考</dt>
    </dl>
"#;

/// Serves fixed HTML by URL, both as listing pages and trailhead pages.
struct StubSite {
    pages: HashMap<&'static str, &'static str>,
}

impl PageSource for StubSite {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .map(|html| html.to_string())
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

impl RecordSource for StubSite {
    async fn fetch(&self, url: &str) -> Result<Record, FetchError> {
        Ok(extract_record(&self.fetch_page(url).await?))
    }
}

#[tokio::test]
async fn crawled_directory_feeds_search() {
    let dir = tempdir().unwrap();
    let site = || StubSite {
        pages: HashMap::from([
            ("http://x/list", LISTING),
            ("http://x/trailhead/trailhead-2", TRAILHEAD_PAGE),
        ]),
    };

    let crawled = ListingCrawler::new(site())
        .with_delay(Duration::ZERO)
        .crawl(["http://x/list"])
        .await
        .unwrap();
    let path = dir.path().join("tozanguchi.json");
    std::fs::write(&path, serde_json::to_string_pretty(&crawled).unwrap()).unwrap();

    let directory = TrailheadDirectory::load(&path).unwrap();
    assert_eq!(directory, crawled);
    assert_eq!(directory.mountain_keys_for(["甲斐駒"]), vec!["甲斐駒ヶ岳"]);
    let trailheads = directory.trailheads("甲斐駒ヶ岳").unwrap();
    let names: Vec<&str> = trailheads.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["竹宇駒ヶ岳神社", "北沢峠"]);

    let client = CachedTrailheadClient::new(
        site(),
        &StoreConfig::new(dir.path().join("cache"), TRAILHEAD_NAMESPACE),
    );
    let url = trailheads.get("竹宇駒ヶ岳神社").unwrap();
    let record = client
        .get_trailhead_record(url, false, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(parking_count(&record), 50);
    assert_eq!(climb_minutes_for("甲斐駒ヶ岳", &record), 690);
    assert!(is_acceptable(
        "甲斐駒ヶ岳",
        &record,
        &AcceptanceCriteria::new(0, 720, 30)
    ));

    // The other trailhead page is missing upstream.
    let missing = trailheads.get("北沢峠").unwrap();
    assert!(client.get_trailhead_record(missing, false, false).await.is_err());
}
