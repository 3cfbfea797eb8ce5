//! Chat Emoji Cache - read-through caching proxy for YouTube chat emoji
//!
//! Serves emoji images from a local cache directory and fetches anything
//! missing from the upstream emoji host.

use chat_emoji_cache::dump::dump;
use chat_emoji_cache::{
    start_server, BlockingList, Config, EmojiCacheError, EmojiFetcher, HttpUpstream, Result,
    ServerState, SharedState,
};
use chat_emoji_store::CacheStore;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logging
    let level = config.log_directive_level();
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("chat_emoji_cache={}", level).parse()?)
        .add_directive(format!("chat_emoji_store={}", level).parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let blocking = BlockingList::load(config.blocking_list.as_deref())?;

    if let Some((from, to)) = config.dump_paths() {
        info!(from = ?from, to = ?to, "Dumping cached emoji");
        dump(&from, &to, &blocking).await?;
        return Ok(());
    }

    info!("Starting Chat Emoji Cache...");
    info!("Upstream: {}", config.chat_host);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Blocked paths: {}", blocking.len());

    let store = CacheStore::new(config.cache_dir.clone());
    store.init().await?;

    let upstream = HttpUpstream::with_timeout(&config.chat_host, config.upstream_timeout())?;
    let fetcher = EmojiFetcher::new(Arc::new(store), Arc::new(blocking), Arc::new(upstream));

    let state: SharedState = Arc::new(ServerState::new(fetcher, config.public_url.clone()));

    // Start HTTP server (blocking)
    start_server(state, &config.host, config.port)
        .await
        .map_err(|e| EmojiCacheError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
