//! Raw trailhead record sources.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::FetchError;
use super::html::extract_record;
use super::record::Record;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can produce the raw record for a trailhead URL.
///
/// Implementations return the record as found on the page, before
/// [`Record::normalize`]. An empty record is valid; transport failures are
/// errors.
pub trait RecordSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Record, FetchError>> + Send;
}

/// Something that can download the HTML of a page.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Configuration for [`HttpRecordSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl HttpSourceConfig {
    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches pages over HTTP. As a [`RecordSource`] it extracts the
/// label/value pairs of trailhead pages.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    http: reqwest::Client,
}

impl HttpRecordSource {
    /// Create a new source.
    pub fn new(config: HttpSourceConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http })
    }
}

impl PageSource for HttpRecordSource {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

impl RecordSource for HttpRecordSource {
    async fn fetch(&self, url: &str) -> Result<Record, FetchError> {
        let body = self.fetch_page(url).await?;
        let record = extract_record(&body);
        debug!(url, fields = record.len(), "extracted trailhead record");
        Ok(record)
    }
}
