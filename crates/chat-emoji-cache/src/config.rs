//! Command line and environment configuration

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CHAT_HOST: &str = "https://yt3.ggpht.com";

/// YouTube chat emoji cache server
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-emoji-cache", version, about)]
pub struct Config {
    /// Directory holding cache records
    #[arg(long, env = "CACHE_DIR", default_value = "./cache")]
    pub cache_dir: PathBuf,

    /// File listing paths that are never cached, one per line
    #[arg(long, env = "BLOCKING_LIST")]
    pub blocking_list: Option<PathBuf>,

    /// Record file or cache directory to dump as images, then exit
    #[arg(long, requires = "dump_to")]
    pub dump_from: Option<PathBuf>,

    /// Output file or directory for --dump-from
    #[arg(long, requires = "dump_from")]
    pub dump_to: Option<PathBuf>,

    /// Upstream emoji host
    #[arg(long, env = "CHAT_HOST", default_value = DEFAULT_CHAT_HOST, value_parser = parse_base_url)]
    pub chat_host: String,

    /// Listen host
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 12428)]
    pub port: u16,

    /// Public base URL used for links on the landing page
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Upper bound on a single upstream request, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    /// Log level for this service (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Source and destination when running as a dump tool
    pub fn dump_paths(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.dump_from, &self.dump_to) {
            (Some(from), Some(to)) => Some((from.clone(), to.clone())),
            _ => None,
        }
    }

    /// `tracing` filter level, accepting `warning` and `fatal` as aliases
    pub fn log_directive_level(&self) -> &str {
        match self.log_level.as_str() {
            "warning" => "warn",
            "fatal" | "critical" => "error",
            other => other,
        }
    }
}

fn parse_base_url(value: &str) -> Result<String, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid URL {:?}: {}", value, e))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["chat-emoji-cache"]).unwrap();
        assert_eq!(config.chat_host, DEFAULT_CHAT_HOST);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(30));
        assert!(config.dump_paths().is_none());
    }

    #[test]
    fn test_explicit_arguments() {
        let config = Config::try_parse_from([
            "chat-emoji-cache",
            "--cache-dir",
            "/var/cache/emoji",
            "--blocking-list",
            "/etc/emoji/blocking.txt",
            "--chat-host",
            "https://example.com/",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level",
            "warning",
        ])
        .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/emoji"));
        assert_eq!(
            config.blocking_list,
            Some(PathBuf::from("/etc/emoji/blocking.txt"))
        );
        assert_eq!(config.chat_host, "https://example.com");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_directive_level(), "warn");
    }

    #[test]
    fn test_environment_variable_names() {
        use clap::CommandFactory;

        let command = Config::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("host").as_deref(), Some("HOST"));
        assert_eq!(env_of("port").as_deref(), Some("PORT"));
        assert_eq!(env_of("cache_dir").as_deref(), Some("CACHE_DIR"));
        assert_eq!(env_of("chat_host").as_deref(), Some("CHAT_HOST"));
    }

    #[test]
    fn test_dump_flags_require_each_other() {
        assert!(Config::try_parse_from(["chat-emoji-cache", "--dump-from", "cache"]).is_err());

        let config = Config::try_parse_from([
            "chat-emoji-cache",
            "--dump-from",
            "cache",
            "--dump-to",
            "images",
        ])
        .unwrap();
        assert_eq!(
            config.dump_paths(),
            Some((PathBuf::from("cache"), PathBuf::from("images")))
        );
    }

    #[test]
    fn test_rejects_invalid_chat_host() {
        assert!(Config::try_parse_from(["chat-emoji-cache", "--chat-host", "not a url"]).is_err());
        assert!(
            Config::try_parse_from(["chat-emoji-cache", "--chat-host", "ftp://example.com"])
                .is_err()
        );
    }
}
