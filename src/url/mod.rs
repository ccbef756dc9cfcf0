//! URL handling module for webmirror
//!
//! This module provides seed validation, canonical deduplication keys,
//! same-origin checks, reject/exclude filtering, and the mapping from remote
//! URLs to paths inside the mirror tree.

mod domain;
mod local_path;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_authority, is_same_origin};
pub use local_path::{local_path, relative_path, INDEX_FILE};
pub use matcher::{FilterVerdict, ResourceFilter};
pub use normalize::{canonical_key, is_fetchable_scheme, parse_seed};

use url::Url;

/// Analytics endpoints that are never rewritten or fetched
const ANALYTICS_MARKERS: &[&str] = &["google-analytics.com", "analytics.js"];

/// Returns true if the URL points at a known analytics endpoint
pub fn is_analytics(url: &Url) -> bool {
    let s = url.as_str();
    ANALYTICS_MARKERS.iter().any(|marker| s.contains(marker))
}

/// Resolves a reference found in a document against the document URL
///
/// Returns `Ok(None)` for references that never name a fetchable resource:
/// blank values, fragment-only anchors, and non-http(s) schemes such as
/// `mailto:`, `javascript:` or `data:`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmirror::url::resolve_reference;
///
/// let base = Url::parse("https://example.com/blog/post").unwrap();
///
/// let logo = resolve_reference(&base, "//example.com/logo.png").unwrap().unwrap();
/// assert_eq!(logo.as_str(), "https://example.com/logo.png");
///
/// assert!(resolve_reference(&base, "#comments").unwrap().is_none());
/// assert!(resolve_reference(&base, "mailto:me@example.com").unwrap().is_none());
/// ```
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Option<Url>, ::url::ParseError> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return Ok(None);
    }

    let resolved = base.join(reference)?;
    if !is_fetchable_scheme(&resolved) {
        return Ok(None);
    }

    Ok(Some(resolved))
}
