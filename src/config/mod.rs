//! Configuration module for webmirror
//!
//! This module handles the mirror run settings: defaults, loading from an
//! optional TOML file, validation, and rate-limit parsing.
//!
//! # Example
//!
//! ```no_run
//! use webmirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirror will follow links up to depth {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    MirrorConfig, RateLimit, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_DEPTH,
    DEFAULT_REQUEST_TIMEOUT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
