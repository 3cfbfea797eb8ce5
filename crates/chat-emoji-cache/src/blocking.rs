//! Paths that are served but never written to the cache

use crate::error::Result;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Set of request paths exempt from caching, matched exactly against the raw
/// request path (not the encoded key)
#[derive(Debug, Clone, Default)]
pub struct BlockingList {
    paths: HashSet<String>,
}

impl BlockingList {
    /// An empty list: nothing is blocked
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a line-delimited list. Lines are trimmed and blank lines ignored.
    pub fn parse(text: &str) -> Self {
        let paths = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { paths }
    }

    /// Load the list from `path`. No path or a missing file yields an empty list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::empty());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = ?path, "Blocking list not found, nothing will be blocked");
                return Ok(Self::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let list = Self::parse(&text);
        info!(path = ?path, entries = list.len(), "Loaded blocking list");
        Ok(list)
    }

    pub fn is_blocked(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
