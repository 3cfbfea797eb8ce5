//! Export cached records as plain image files

use crate::blocking::BlockingList;
use crate::error::{EmojiCacheError, Result};
use chat_emoji_store::{CacheKey, CacheRecord, CacheStore, CachedEmoji, StoreError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Counts from a dump run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpReport {
    pub written: usize,
    pub skipped_blocked: usize,
    pub failed: usize,
}

/// File extension for a stored content type
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// Dump one record file, or every record in a cache directory, to `to`
///
/// Directory dumps skip paths on the blocking list and keep going past
/// unreadable records.
pub async fn dump(from: &Path, to: &Path, blocking: &BlockingList) -> Result<DumpReport> {
    if fs::metadata(from).await?.is_dir() {
        dump_dir(from, to, blocking).await
    } else {
        dump_file(from, to).await?;
        Ok(DumpReport {
            written: 1,
            ..DumpReport::default()
        })
    }
}

async fn dump_dir(from: &Path, to: &Path, blocking: &BlockingList) -> Result<DumpReport> {
    let store = CacheStore::new(from);
    fs::create_dir_all(to).await?;

    let mut report = DumpReport::default();
    for key in store.list_keys().await? {
        match key.decode() {
            Ok(path) if blocking.is_blocked(&path) => {
                debug!(key = %key, path = %path, "Skipping blocked entry");
                report.skipped_blocked += 1;
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping cache file with undecodable name");
                report.failed += 1;
                continue;
            }
        }

        match store.get(&key).await {
            Ok(Some(emoji)) => {
                write_emoji(&output_path(to, &key, &emoji), &emoji).await?;
                report.written += 1;
            }
            Ok(None) => {}
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(key = %key, error = %e, "Skipping corrupt cache record");
                report.failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        from = ?from,
        to = ?to,
        written = report.written,
        skipped_blocked = report.skipped_blocked,
        failed = report.failed,
        "Dump finished"
    );
    Ok(report)
}

async fn dump_file(from: &Path, to: &Path) -> Result<()> {
    let raw = fs::read(from).await?;
    let corrupt = |reason: String| {
        EmojiCacheError::Store(StoreError::Corrupt {
            key: from.display().to_string(),
            reason,
        })
    };
    let record: CacheRecord = serde_json::from_slice(&raw).map_err(|e| corrupt(e.to_string()))?;
    let emoji = record.into_emoji().map_err(corrupt)?;

    let output = if fs::metadata(to).await.map(|m| m.is_dir()).unwrap_or(false) {
        let stem = from
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "emoji".to_string());
        output_path(to, &CacheKey::from_file_stem(stem), &emoji)
    } else {
        to.to_path_buf()
    };

    write_emoji(&output, &emoji).await
}

fn output_path(dir: &Path, key: &CacheKey, emoji: &CachedEmoji) -> PathBuf {
    dir.join(format!("{}.{}", key, extension_for(&emoji.content_type)))
}

async fn write_emoji(path: &Path, emoji: &CachedEmoji) -> Result<()> {
    fs::write(path, &emoji.body).await?;
    debug!(path = ?path, size = emoji.body.len(), "Wrote emoji");
    Ok(())
}
