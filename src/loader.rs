use reqwest::Client;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::record::{RawWorkRecord, WorkRecord, WorkType};
use crate::tags::Tag;

/// Why a feed fetch failed. The variants exist for diagnostics only — every
/// failure takes the same fallback path and the loader never propagates them.
#[derive(Debug, Error)]
pub enum FeedError {
  #[error("feed request timed out after {0:?}")]
  Timeout(Duration),
  #[error("feed transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("malformed feed: {0}")]
  Malformed(String),
}

/// The canonicalized result of one load: the page's records plus the tag
/// dictionary. Either side may be empty after a failed fetch.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
  pub records: Vec<WorkRecord>,
  pub tags: Vec<Tag>,
}

/// Where the loader fetches from. Defaults come from the embedded constants;
/// tests point these at unroutable endpoints to exercise the failure path.
#[derive(Debug, Clone)]
pub struct FeedConfig {
  pub primary_url: String,
  pub fallback_url: String,
  pub tags_url: String,
  pub timeout: Duration,
}

impl Default for FeedConfig {
  fn default() -> Self {
    let c = constants();
    Self {
      primary_url: c.primary_feed_url.clone(),
      fallback_url: c.fallback_feed_url.clone(),
      tags_url: c.tags_feed_url.clone(),
      timeout: Duration::from_secs(c.feed_timeout_secs),
    }
  }
}

/// Fetches and canonicalizes the work-record and tag feeds for one page.
///
/// `load` is infallible by design: primary fetch with a bounded timeout, one
/// fallback attempt, then an empty catalog. The page always renders — worst
/// case as "no results" — instead of surfacing a network error.
#[derive(Clone)]
pub struct CatalogLoader {
  client: Client,
  feeds: FeedConfig,
  subject: Option<WorkType>,
}

/// Append the cache-busting timestamp the feed host expects.
fn cache_busted(url: &str) -> String {
  let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
  format!("{}?t={}", url, millis)
}

/// Parse the record feed body. The top level must be a JSON array; individual
/// elements degrade to field defaults rather than failing the batch.
pub fn parse_records(body: &str) -> Result<Vec<RawWorkRecord>, FeedError> {
  let value: serde_json::Value =
    serde_json::from_str(body).map_err(|e| FeedError::Malformed(format!("record feed is not JSON: {}", e)))?;
  let items = value.as_array().ok_or_else(|| FeedError::Malformed("record feed top level is not an array".into()))?;
  Ok(items.iter().map(|item| serde_json::from_value(item.clone()).unwrap_or_default()).collect())
}

/// Parse the tag feed body, a `{"tags": [...]}` wrapper object.
pub fn parse_tags(body: &str) -> Result<Vec<Tag>, FeedError> {
  #[derive(serde::Deserialize)]
  struct TagFeed {
    tags: Vec<Tag>,
  }
  let feed: TagFeed =
    serde_json::from_str(body).map_err(|e| FeedError::Malformed(format!("tag feed did not parse: {}", e)))?;
  Ok(feed.tags)
}

impl CatalogLoader {
  /// A loader for one page. `subject` restricts the shared feed to that
  /// page's work type; `None` keeps everything (the detail page does this).
  pub fn new(subject: Option<WorkType>) -> Self {
    Self::with_feeds(FeedConfig::default(), subject)
  }

  pub fn with_feeds(feeds: FeedConfig, subject: Option<WorkType>) -> Self {
    Self { client: Client::new(), feeds, subject }
  }

  /// Fetch a feed body within the configured timeout. One budget covers the
  /// whole exchange, headers and body both; dropping the in-flight future on
  /// timeout aborts the request rather than letting it linger.
  async fn fetch_body(&self, url: &str) -> Result<String, FeedError> {
    let timeout = self.feeds.timeout;
    let fetch = async {
      let response = self.client.get(cache_busted(url)).send().await?;
      let response = response.error_for_status()?;
      response.text().await
    };
    let body = tokio::time::timeout(timeout, fetch).await.map_err(|_| FeedError::Timeout(timeout))??;
    Ok(body)
  }

  async fn fetch_records_from(&self, url: &str) -> Result<Vec<WorkRecord>, FeedError> {
    let body = self.fetch_body(url).await?;
    let raw = parse_records(&body)?;
    Ok(raw.into_iter().map(RawWorkRecord::canonicalize).collect())
  }

  async fn fetch_tags(&self) -> Result<Vec<Tag>, FeedError> {
    let body = self.fetch_body(&self.feeds.tags_url).await?;
    parse_tags(&body)
  }

  /// Records with exactly one fallback attempt, then empty.
  async fn fetch_records(&self) -> Vec<WorkRecord> {
    match self.fetch_records_from(&self.feeds.primary_url).await {
      Ok(records) => records,
      Err(primary_err) => {
        match primary_err {
          FeedError::Timeout(t) => warn!(timeout = ?t, "primary feed timed out, trying fallback"),
          ref e => warn!(err = %e, "primary feed failed, trying fallback"),
        }
        match self.fetch_records_from(&self.feeds.fallback_url).await {
          Ok(records) => records,
          Err(fallback_err) => {
            warn!(err = %fallback_err, "fallback feed failed, rendering empty catalog");
            Vec::new()
          }
        }
      }
    }
  }

  /// Load and canonicalize both feeds. Never fails; see the type docs.
  pub async fn load(&self) -> LoadOutcome {
    let records = self.fetch_records().await;
    let tags = match self.fetch_tags().await {
      Ok(tags) => tags,
      Err(e) => {
        // Tag resolution degrades to "no tags"; the page still works.
        warn!(err = %e, "tag feed failed, continuing without tags");
        Vec::new()
      }
    };

    let total = records.len();
    let records: Vec<WorkRecord> = match &self.subject {
      Some(subject) => records.into_iter().filter(|r| &r.work_type == subject).collect(),
      None => records,
    };
    if let Some(ref subject) = self.subject {
      debug!(subject = subject.as_str(), total, kept = records.len(), "filtered feed to page subject");
    }
    info!(records = records.len(), tags = tags.len(), "catalog load complete");
    LoadOutcome { records, tags }
  }
}
