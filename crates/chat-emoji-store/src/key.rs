//! Cache key derivation
//!
//! A key is the request path encoded with the URL- and filename-safe base64
//! alphabet, so it never contains `/` and maps 1:1 back to the path.

use crate::error::KeyError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use std::fmt;

/// Extension of record files in the cache directory
pub(crate) const RECORD_EXTENSION: &str = "json";

/// Storage identifier for a cached request path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Encode a request path (including any query string) into a key
    pub fn encode(path: &str) -> Result<Self, KeyError> {
        if path.is_empty() {
            return Err(KeyError::Empty);
        }
        if !path.is_ascii() {
            return Err(KeyError::NonAscii);
        }
        Ok(Self(URL_SAFE.encode(path.as_bytes())))
    }

    /// Wrap a file stem read from the cache directory without validating it.
    ///
    /// Use [`CacheKey::decode`] to find out whether it names a real path.
    pub fn from_file_stem(stem: impl Into<String>) -> Self {
        Self(stem.into())
    }

    /// Recover the original request path
    ///
    /// Keys written with the standard alphabet are accepted as well, which
    /// covers records from deployments that predate the URL-safe alphabet.
    pub fn decode(&self) -> Result<String, KeyError> {
        let bytes = URL_SAFE
            .decode(&self.0)
            .or_else(|_| STANDARD.decode(&self.0))
            .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;

        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }
        if !bytes.is_ascii() {
            return Err(KeyError::NonAscii);
        }
        String::from_utf8(bytes).map_err(|e| KeyError::InvalidEncoding(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the record file holding this key's entry
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, RECORD_EXTENSION)
    }

    /// Record name under the standard base64 alphabet, when it differs from
    /// [`CacheKey::file_name`] and is a valid flat file name
    pub fn legacy_file_name(&self) -> Option<String> {
        if !self.0.contains(['-', '_']) {
            return None;
        }
        let standard: String = self
            .0
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        if standard.contains('/') {
            return None;
        }
        Some(format!("{}.{}", standard, RECORD_EXTENSION))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
