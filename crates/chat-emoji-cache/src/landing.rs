//! Landing page listing every cached emoji

use crate::error::Result;
use chat_emoji_store::CacheStore;
use tracing::debug;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Chat Emoji Caches</title>
<style>
    #emojis {
        line-height: 0;
        column-count: 12;
        column-gap: 1em;
        margin: auto;
        width: 80%;
    }

    #emojis img {
        display: block;
        width: 100% !important;
        height: auto !important;
        padding-top: 1em;
    }

    @media (max-width: 400px) {
        #emojis {
            column-count: 6;
        }
    }

    body {
        margin: 0;
        padding: 0;
    }
</style>
</head>
<body>
<section id="emojis">
"#;

const PAGE_TAIL: &str = "</section>\n</body>\n</html>\n";

/// Original request paths of every cached entry, sorted and deduplicated
///
/// Files whose names do not decode to a path are skipped. A path stored under
/// both key alphabets is listed once.
pub async fn cached_paths(store: &CacheStore) -> Result<Vec<String>> {
    let keys = store.list_keys().await?;

    let mut paths: Vec<String> = keys
        .into_iter()
        .filter_map(|key| match key.decode() {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(key = %key, error = %e, "Skipping undecodable cache file");
                None
            }
        })
        .collect();
    paths.sort();
    paths.dedup();

    Ok(paths)
}

/// Render the landing page. Links are relative unless `public_url` is set.
pub fn render_landing(paths: &[String], public_url: Option<&str>) -> String {
    let base = public_url.unwrap_or("").trim_end_matches('/');

    let mut html = String::from(PAGE_HEAD);
    for path in paths {
        html.push_str("    <img src=\"");
        html.push_str(&escape_attr(base));
        html.push_str(&escape_attr(path));
        html.push_str("\" loading=\"lazy\">\n");
    }
    html.push_str(PAGE_TAIL);
    html
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_emoji_store::CacheKey;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cached_paths_decodes_keys() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        for path in ["/b", "/a", "/c?s=48"] {
            let key = CacheKey::encode(path).unwrap();
            store.put(&key, "image/png", b"x").await.unwrap();
        }

        let paths = cached_paths(&store).await.unwrap();
        assert_eq!(paths, vec!["/a", "/b", "/c?s=48"]);
    }

    #[tokio::test]
    async fn test_cached_paths_skips_malformed_names() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheKey::encode("/good").unwrap();
        store.put(&key, "image/png", b"x").await.unwrap();
        std::fs::write(dir.path().join("not base64!.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("_w==.json"), b"{}").unwrap();

        let paths = cached_paths(&store).await.unwrap();
        assert_eq!(paths, vec!["/good"]);
    }

    #[tokio::test]
    async fn test_cached_paths_lists_path_in_both_alphabets_once() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        std::fs::write(
            dir.path().join("Lz4+Pg==.json"),
            br#"{"cache_time": 1.0, "headers": {"Content-type": "image/png"}, "data": "b2xk"}"#,
        )
        .unwrap();
        let key = CacheKey::encode("/>>>").unwrap();
        store.put(&key, "image/png", b"new").await.unwrap();

        let paths = cached_paths(&store).await.unwrap();
        assert_eq!(paths, vec!["/>>>"]);
    }

    #[tokio::test]
    async fn test_cached_paths_empty_store() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("never-created"));
        assert!(cached_paths(&store).await.unwrap().is_empty());
    }

    #[test]
    fn test_render_relative_links() {
        let html = render_landing(&["/a".to_string(), "/b".to_string()], None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Chat Emoji Caches</title>"));
        assert!(html.contains(r#"<img src="/a""#));
        assert!(html.contains(r#"<img src="/b""#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_with_public_url() {
        let html = render_landing(
            &["/emoji/x=w48".to_string()],
            Some("https://chat-emoji.example.com/"),
        );
        assert!(html.contains(r#"<img src="https://chat-emoji.example.com/emoji/x=w48""#));
    }

    #[test]
    fn test_render_escapes_attribute() {
        let html = render_landing(&["/a\"><script>&".to_string()], None);
        assert!(html.contains("/a&quot;&gt;&lt;script&gt;&amp;"));
        assert!(!html.contains("<script>"));
    }
}
