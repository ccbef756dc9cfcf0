//! Webmirror: an offline website mirror
//!
//! This crate implements a recursive, same-origin website mirror. Starting from
//! a seed URL it discovers linked resources, downloads them with optional
//! bandwidth limiting and live progress output, and rewrites embedded links so
//! the mirrored tree can be browsed without a network connection.

pub mod config;
pub mod crawler;
pub mod output;
pub mod progress;
pub mod rewrite;
pub mod state;
pub mod transfer;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to rewrite links in {url}: {source}")]
    Rewrite { url: String, source: RewriteError },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mirror interrupted")]
    Interrupted,
}

impl MirrorError {
    /// Returns true for errors that abort the whole run rather than one resource
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InvalidSeed(_)
                | Self::OutputDir { .. }
                | Self::Client(_)
                | Self::Interrupted
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid rate limit '{0}'")]
    InvalidRateLimit(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised while rewriting links inside a payload
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("HTML rewriting failed: {0}")]
    Html(String),

    #[error("Payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{MirrorConfig, RateLimit};
pub use crawler::{mirror, Coordinator};
pub use output::MirrorSummary;
pub use progress::{ProgressEvent, ProgressRenderer, ProgressReporter};
pub use crate::url::{canonical_key, local_path, relative_path};
