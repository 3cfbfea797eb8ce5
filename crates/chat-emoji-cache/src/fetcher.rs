//! Read-through fetch: cache lookup, upstream fetch, store on success

use crate::blocking::BlockingList;
use crate::error::Result;
use crate::upstream::Upstream;
use chat_emoji_store::{CacheKey, CacheStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a served body came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheStatus {
    /// Replayed from the cache
    Hit { cached_at: Option<DateTime<Utc>> },
    /// Fetched from upstream, stored if the status was 200
    Miss,
    /// Fetched from upstream for a blocked path, never stored
    Bypass,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header
    pub fn as_header(&self) -> &'static str {
        match self {
            CacheStatus::Hit { .. } => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// Result of a read-through fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub source: CacheStatus,
}

/// Stateless read-through service shared by every request
///
/// Concurrent first fetches of the same path may both reach upstream and
/// both write; the store's rename keeps the surviving record whole.
#[derive(Clone)]
pub struct EmojiFetcher {
    store: Arc<CacheStore>,
    blocking: Arc<BlockingList>,
    upstream: Arc<dyn Upstream>,
}

impl EmojiFetcher {
    pub fn new(
        store: Arc<CacheStore>,
        blocking: Arc<BlockingList>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            store,
            blocking,
            upstream,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn blocking(&self) -> &BlockingList {
        &self.blocking
    }

    /// Serve `path` (request path plus query) from the cache, or from
    /// upstream on a miss
    pub async fn fetch(&self, path: &str) -> Result<FetchOutcome> {
        let key = CacheKey::encode(path)?;

        match self.store.get(&key).await {
            Ok(Some(emoji)) => {
                let cached_at = emoji.cached_at();
                info!(
                    key = %key,
                    cache_time = emoji.cache_time,
                    datetime = ?cached_at,
                    "Cache hit"
                );
                return Ok(FetchOutcome {
                    status: 200,
                    content_type: emoji.content_type,
                    body: emoji.body,
                    source: CacheStatus::Hit { cached_at },
                });
            }
            Ok(None) => {}
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(key = %key, error = %e, "Unreadable cache record, fetching again");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, fetching from upstream");
            }
        }

        let url = self.upstream.url(path);
        let response = self.upstream.get(path).await?;

        let blocked = self.blocking.is_blocked(path);
        if blocked {
            info!(fetch_url = %url, status_code = response.status, "Cache ignore");
        } else {
            info!(fetch_url = %url, status_code = response.status, "Cache miss");
        }

        if response.status == 200 && !blocked {
            if let Err(e) = self
                .store
                .put(&key, &response.content_type, &response.body)
                .await
            {
                warn!(key = %key, error = %e, "Failed to cache emoji");
                // Serve the upstream body anyway
            }
        }

        Ok(FetchOutcome {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
            source: if blocked {
                CacheStatus::Bypass
            } else {
                CacheStatus::Miss
            },
        })
    }
}
