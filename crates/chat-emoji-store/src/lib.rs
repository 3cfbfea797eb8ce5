//! On-disk record store for cached chat emoji images
//!
//! Each cached response lives in its own JSON record named after a reversible
//! base64 encoding of the request path. Records are written once per
//! successful upstream fetch and never expire.

mod error;
mod key;
mod store;
mod types;

pub use error::{KeyError, Result, StoreError};
pub use key::CacheKey;
pub use store::CacheStore;
pub use types::{CacheRecord, CachedEmoji, RecordHeaders};
