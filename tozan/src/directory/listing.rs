//! Building the directory from mountain listing pages.
//!
//! A listing page holds an `<article>` with one `<h3>` heading per mountain
//! and, in the same order, one `<p class="th_data">` per mountain linking to
//! its trailhead pages.

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::MountainName;
use crate::trailhead::{FetchError, PageSource, attr_value, elements, has_class, text_content};

use super::{TrailheadDirectory, TrailheadDirectoryBuilder, Trailheads};

/// Pause between listing page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Path fragment that marks a link as a trailhead page.
const TRAILHEAD_LINK_MARKER: &str = "trailhead/trailhead";

/// Class of the paragraph holding one mountain's trailhead links.
const TRAILHEAD_LIST_CLASS: &str = "th_data";

/// Whether `url` points at a trailhead page.
pub fn is_trailhead_link(url: &str) -> bool {
    url.contains(TRAILHEAD_LINK_MARKER)
}

/// A link on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// One mountain and its links, as listed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Heading with the qualifier tail removed. Empty if the page has more
    /// link paragraphs than headings.
    pub mountain: String,
    pub links: Vec<Link>,
}

impl ListingEntry {
    /// The entry's trailhead links, deduplicated by name.
    pub fn trailheads(&self) -> Trailheads {
        let mut trailheads = Trailheads::new();
        for link in self.links.iter().filter(|l| is_trailhead_link(&l.href)) {
            trailheads.insert_unique(&link.text, &link.href);
        }
        trailheads
    }
}

/// Parse the mountains of one listing page.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let Some(article) = elements(html, "article").into_iter().next() else {
        return Vec::new();
    };

    let names: Vec<String> = elements(article.inner, "h3")
        .into_iter()
        .map(|h| MountainName::display(&text_content(h.inner)).to_string())
        .collect();

    elements(article.inner, "p")
        .into_iter()
        .filter(|p| has_class(p.attrs, TRAILHEAD_LIST_CLASS))
        .enumerate()
        .map(|(i, p)| ListingEntry {
            mountain: names.get(i).cloned().unwrap_or_default(),
            links: elements(p.inner, "a")
                .into_iter()
                .filter_map(|a| {
                    Some(Link {
                        href: attr_value(a.attrs, "href")?.trim().to_string(),
                        text: text_content(a.inner),
                    })
                })
                .collect(),
        })
        .collect()
}

/// URLs of numbered listing pages: `prefix` followed by each page number.
///
/// ```
/// use tozan::directory::paged_urls;
///
/// assert_eq!(paged_urls("https://x/list?page=", 2, 3), vec![
///     "https://x/list?page=2",
///     "https://x/list?page=3",
/// ]);
/// ```
pub fn paged_urls(prefix: &str, first: u32, last: u32) -> Vec<String> {
    (first..=last).map(|n| format!("{prefix}{n}")).collect()
}

/// Crawls listing pages into a [`TrailheadDirectory`].
pub struct ListingCrawler<P> {
    source: P,
    delay: Duration,
}

impl<P: PageSource> ListingCrawler<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            delay: DEFAULT_PAGE_DELAY,
        }
    }

    /// Set the pause between page requests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch every page in order and collect its mountains.
    ///
    /// Repeated mountain names get a `_N` suffix. Entries without a heading
    /// are skipped. A failed page fetch aborts the crawl.
    pub async fn crawl<I, S>(&self, urls: I) -> Result<TrailheadDirectory, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TrailheadDirectoryBuilder::new();
        for (i, url) in urls.into_iter().enumerate() {
            let url = url.as_ref();
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let html = self.source.fetch_page(url).await?;
            let entries = parse_listing(&html);
            info!(url, mountains = entries.len(), "parsed listing page");

            for entry in entries {
                if entry.mountain.is_empty() {
                    debug!(url, links = entry.links.len(), "skipping entry without heading");
                    continue;
                }
                builder.add_mountain(&entry.mountain, entry.trailheads());
            }
        }
        Ok(builder.build())
    }

    pub fn source(&self) -> &P {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const PAGE_1: &str = r#"
        <html><body>
        <nav><h3>menu</h3><p class="th_data"><a href="/trailhead/trailhead-0">x</a></p></nav>
        <article>
          <h3>大山（鳥取県）</h3>
          <p class="th_data">
            <a href="https://example.com/trailhead/trailhead-1">大山寺</a>
            <a href="https://example.com/trailhead/trailhead-2">大山寺</a>
            <a href="https://example.com/map/1">地図</a>
          </p>
          <h3>雲取山&nbsp;2017m</h3>
          <p class="lead">not a trailhead list</p>
          <p class="th_data"><a href="https://example.com/trailhead/trailhead-3">鴨沢</a></p>
        </article>
        </body></html>
    "#;

    const PAGE_2: &str = r#"
        <article>
          <h3>大山(神奈川県)</h3>
          <p class="th_data"><a href='https://example.com/trailhead/trailhead-4'>ヤビツ峠</a></p>
          <p class="th_data"><a href="https://example.com/trailhead/trailhead-5">orphan</a></p>
        </article>
    "#;

    struct StubPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubPages {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl PageSource for StubPages {
        async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }

    #[test]
    fn trailhead_links() {
        assert!(is_trailhead_link("https://example.com/trailhead/trailhead-1"));
        assert!(!is_trailhead_link("https://example.com/map/1"));
    }

    #[test]
    fn parses_article_only() {
        let entries = parse_listing(PAGE_1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mountain, "大山");
        assert_eq!(entries[0].links.len(), 3);
        assert_eq!(entries[1].mountain, "雲取山");
        assert_eq!(entries[1].links[0].text, "鴨沢");
    }

    #[test]
    fn entry_trailheads_skip_other_links() {
        let entries = parse_listing(PAGE_1);
        let trailheads = entries[0].trailheads();
        let names: Vec<&str> = trailheads.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["大山寺", "大山寺_2"]);
        assert_eq!(
            trailheads.get("大山寺_2"),
            Some("https://example.com/trailhead/trailhead-2")
        );
    }

    #[test]
    fn page_without_article_is_empty() {
        assert!(parse_listing("<html><h3>x</h3></html>").is_empty());
    }

    #[tokio::test]
    async fn crawl_merges_pages_in_order() {
        let crawler = ListingCrawler::new(StubPages::new(&[("p1", PAGE_1), ("p2", PAGE_2)]))
            .with_delay(Duration::ZERO);

        let dir = crawler.crawl(["p1", "p2"]).await.unwrap();

        assert_eq!(
            dir.mountains().collect::<Vec<_>>(),
            vec!["大山", "雲取山", "大山_2"]
        );
        assert_eq!(
            dir.trailheads("大山_2").and_then(|t| t.get("ヤビツ峠")),
            Some("https://example.com/trailhead/trailhead-4")
        );
        assert_eq!(*crawler.source().requested.lock().unwrap(), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn crawl_stops_on_failed_page() {
        let crawler =
            ListingCrawler::new(StubPages::new(&[("p1", PAGE_1)])).with_delay(Duration::ZERO);

        let err = crawler.crawl(["missing", "p1"]).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(crawler.source().requested.lock().unwrap().len(), 1);
    }
}
