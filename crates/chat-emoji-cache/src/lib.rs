//! Chat Emoji Cache
//!
//! Provides the read-through fetcher, blocking policy, landing page and
//! HTTP server for the chat emoji caching proxy.

pub mod blocking;
pub mod config;
pub mod dump;
pub mod error;
pub mod fetcher;
pub mod landing;
pub mod server;
pub mod types;
pub mod upstream;

pub use blocking::BlockingList;
pub use config::Config;
pub use error::{EmojiCacheError, Result};
pub use fetcher::{CacheStatus, EmojiFetcher, FetchOutcome};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use upstream::{HttpUpstream, Upstream, UpstreamResponse};
