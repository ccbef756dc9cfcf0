//! State module for tracking one mirror run
//!
//! This module provides the shared crawl state: which URLs have been claimed,
//! the origin and depth bounds, and which depths are currently being traversed.
//!
//! # Components
//!
//! - `CrawlState`: Atomic claim of URLs plus the active-depth gauge
//! - `ResourceTask`: A claimed URL with its discovery depth
//! - `Claim`: Why a URL was or was not claimed

mod crawl_state;

// Re-export main types
pub use crawl_state::{Claim, CrawlState, DepthGuard, ResourceTask};
