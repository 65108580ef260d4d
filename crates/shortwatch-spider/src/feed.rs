use crate::cache::{CacheRecord, ValidatorStore};
use crate::config::FeedConfig;
use crate::http::*;
use reqwest::header::{
    HeaderMap, HeaderName, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use reqwest::StatusCode;
use tracing::{debug, error, info, trace, warn};

/// Outcome of a single update check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    /// New validators were seen (and stored); `body` is the feed text.
    Updated { body: String },

    /// The server answered `304 Not Modified`.
    NotModified,

    /// The server answered `200 OK` with the validators already stored.
    Unchanged,

    /// Any status other than 200 or 304.
    UnexpectedStatus(u16),

    /// The request (or reading its body) failed.
    Failed,
}

impl FeedStatus {
    pub fn is_updated(&self) -> bool {
        matches!(self, FeedStatus::Updated { .. })
    }

    /// Split into the `(updated, content)` pair.
    pub fn into_parts(self) -> (bool, Option<String>) {
        match self {
            FeedStatus::Updated { body } => (true, Some(body)),
            _ => (false, None),
        }
    }
}

/// Conditional GET poller for a single feed.
pub struct UpdateChecker<S> {
    http_client: HttpClient,
    config: FeedConfig,
    store: S,
}

impl<S: ValidatorStore> UpdateChecker<S> {
    pub fn new(http_client: HttpClient, config: FeedConfig, store: S) -> Self {
        Self {
            http_client,
            config,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the feed, sending the stored validators, and report whether it changed.
    ///
    /// Never fails: every error is logged and reported as "not updated". The
    /// stored validators are replaced only when `Updated` is returned.
    pub async fn check_for_update(&self) -> FeedStatus {
        let cached = self.load_validators().await;

        trace!("fetching feed {} with validators {cached:?}", self.config.url);
        let mut request = self.http_client.get(&self.config.url);
        if let Some(etag) = &cached.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = &cached.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("failed to fetch feed {}, error({err})", self.config.url);
                return FeedStatus::Failed;
            }
        };

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                info!("no update detected (304 Not Modified)");
                FeedStatus::NotModified
            }
            StatusCode::OK => {
                let fresh = validators(response.headers());
                if fresh == cached {
                    info!("no validator changes detected despite 200 response");
                    return FeedStatus::Unchanged;
                }

                let body = match response.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        error!("failed to read feed body, error({err})");
                        return FeedStatus::Failed;
                    }
                };

                info!("update detected; new feed data received");
                debug!("validators changed from {cached:?} to {fresh:?}");
                if let Err(err) = self.store.save(&fresh).await {
                    error!("failed to save validators, error({err})");
                }

                FeedStatus::Updated { body }
            }
            status => {
                warn!("unexpected status code from feed: {status}");
                FeedStatus::UnexpectedStatus(status.as_u16())
            }
        }
    }

    async fn load_validators(&self) -> CacheRecord {
        match self.store.load().await {
            Ok(record) => record,
            Err(err) => {
                error!("failed to load validators, starting empty, error({err})");
                CacheRecord::default()
            }
        }
    }
}

/// Read the `ETag` and `Last-Modified` response headers.
fn validators(headers: &HeaderMap) -> CacheRecord {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
    };
    CacheRecord::new(header(ETAG), header(LAST_MODIFIED))
}
