//! Error types for the chat emoji cache

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chat_emoji_store::{KeyError, StoreError};
use std::fmt;

use crate::types::ErrorResponse;

#[derive(Debug)]
pub enum EmojiCacheError {
    /// The request path cannot be encoded as a cache key
    Key(KeyError),
    Store(StoreError),
    /// Network or TLS failure talking to upstream, including timeouts
    Upstream(Box<reqwest::Error>),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for EmojiCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmojiCacheError::Key(err) => write!(f, "Invalid path: {}", err),
            EmojiCacheError::Store(err) => write!(f, "Cache store error: {}", err),
            EmojiCacheError::Upstream(err) => write!(f, "Upstream error: {}", err),
            EmojiCacheError::Io(err) => write!(f, "IO error: {}", err),
            EmojiCacheError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for EmojiCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmojiCacheError::Key(err) => Some(err),
            EmojiCacheError::Store(err) => Some(err),
            EmojiCacheError::Upstream(err) => Some(err.as_ref()),
            EmojiCacheError::Io(err) => Some(err.as_ref()),
            EmojiCacheError::Config(_) => None,
        }
    }
}

impl From<KeyError> for EmojiCacheError {
    fn from(err: KeyError) -> Self {
        EmojiCacheError::Key(err)
    }
}

impl From<StoreError> for EmojiCacheError {
    fn from(err: StoreError) -> Self {
        EmojiCacheError::Store(err)
    }
}

impl From<reqwest::Error> for EmojiCacheError {
    fn from(err: reqwest::Error) -> Self {
        EmojiCacheError::Upstream(Box::new(err))
    }
}

impl From<std::io::Error> for EmojiCacheError {
    fn from(err: std::io::Error) -> Self {
        EmojiCacheError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for EmojiCacheError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        EmojiCacheError::Config(err.to_string())
    }
}

impl IntoResponse for EmojiCacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            EmojiCacheError::Key(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            EmojiCacheError::Upstream(err) => {
                tracing::error!(error = %err, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, "Upstream unavailable".to_string())
            }
            _ => {
                tracing::error!(error = %self, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, EmojiCacheError>;
