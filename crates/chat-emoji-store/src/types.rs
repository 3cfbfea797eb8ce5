//! Cache record types

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headers retained from the upstream response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordHeaders {
    #[serde(rename = "Content-type")]
    pub content_type: String,
}

/// A cache record as stored on disk
///
/// Field names are shared with existing cache directories and the dump tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Creation time in seconds since the Unix epoch
    pub cache_time: f64,
    pub headers: RecordHeaders,
    /// Body bytes in standard base64
    pub data: String,
}

impl CacheRecord {
    /// Build a record for a freshly fetched body, stamped with the current time
    pub fn new(content_type: &str, body: &[u8]) -> Self {
        Self {
            cache_time: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            headers: RecordHeaders {
                content_type: content_type.to_string(),
            },
            data: STANDARD.encode(body),
        }
    }

    /// Decode the body, returning the reason on failure
    pub fn into_emoji(self) -> Result<CachedEmoji, String> {
        let body = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| format!("undecodable body: {}", e))?;

        Ok(CachedEmoji {
            content_type: self.headers.content_type,
            body,
            cache_time: self.cache_time,
        })
    }
}

/// A decoded cache entry, ready to be replayed
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEmoji {
    pub content_type: String,
    pub body: Vec<u8>,
    pub cache_time: f64,
}

impl CachedEmoji {
    /// Creation time as a calendar timestamp, for logging
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.cache_time * 1000.0) as i64)
    }
}
