//! Error types for the emoji record store

use std::fmt;

/// A request path that cannot be turned into a key, or a key that cannot be
/// turned back into a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    Empty,
    NonAscii,
    InvalidEncoding(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Empty => write!(f, "Empty path"),
            KeyError::NonAscii => write!(f, "Path contains non-ASCII characters"),
            KeyError::InvalidEncoding(msg) => write!(f, "Invalid key encoding: {}", msg),
        }
    }
}

impl std::error::Error for KeyError {}

#[derive(Debug)]
pub enum StoreError {
    Io(Box<std::io::Error>),
    /// A record exists on disk but cannot be parsed or its body decoded
    Corrupt { key: String, reason: String },
    Serialize(Box<serde_json::Error>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "IO error: {}", err),
            StoreError::Corrupt { key, reason } => {
                write!(f, "Corrupt cache record {}: {}", key, reason)
            }
            StoreError::Serialize(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err.as_ref()),
            StoreError::Serialize(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
