//! Crawler module for mirror fetching and coordination
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching with progress reporting and bandwidth limiting
//! - Frontier scheduling within a concurrency budget
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{mirror, Coordinator};
pub use fetcher::{
    build_http_client, fetch_resource, FetchResult, ACCEPT_LANGUAGE_VALUE, ACCEPT_VALUE,
    DEFAULT_USER_AGENT,
};
pub use scheduler::{Frontier, ScheduledFetch, Scheduler};
