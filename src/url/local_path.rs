//! Mapping from remote URLs to paths inside the mirror tree
//!
//! The mapping is a pure function of the URL. Queries and fragments never
//! influence the result.

use std::path::{Path, PathBuf};
use url::Url;

use super::domain::extract_authority;

/// File written for directory-like and dynamic URLs
pub const INDEX_FILE: &str = "index.html";

/// Subtree holding dynamically routed pages
const PAGES_DIR: &str = "pages";

/// Path segments that mark a server-rendered route rather than a static file
const DYNAMIC_SEGMENTS: &[&str] = &[
    "api", "v1", "v2", "v3", "blob", "tree", "branch", "tag", "commit", "pull", "issues", "wiki",
    "raw", "edit",
];

/// Maps a URL to its path relative to the mirror root
///
/// Rules, first match wins:
///
/// 1. Last path segment has an extension: `<host>/<path>`.
/// 2. Some segment is numeric or a dynamic-route keyword:
///    `<host>/pages/<path>/index.html`.
/// 3. Otherwise `<host>/<path>/index.html`.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use url::Url;
/// use webmirror::url::local_path;
///
/// let u = Url::parse("https://example.com/css/site.css").unwrap();
/// assert_eq!(local_path(&u), PathBuf::from("example.com/css/site.css"));
///
/// let u = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(local_path(&u), PathBuf::from("example.com/about/index.html"));
///
/// let u = Url::parse("https://example.com/users/42").unwrap();
/// assert_eq!(local_path(&u), PathBuf::from("example.com/pages/users/42/index.html"));
/// ```
pub fn local_path(url: &Url) -> PathBuf {
    let mut path = PathBuf::from(extract_authority(url).unwrap_or_default());

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(decode_segment).collect())
        .unwrap_or_default();

    let last = segments.last().map(String::as_str).unwrap_or("");

    if has_file_extension(last) {
        path.extend(segments.iter().filter(|s| !s.is_empty()));
        return path;
    }

    if segments.iter().any(|s| is_dynamic_segment(s)) {
        path.push(PAGES_DIR);
    }

    path.extend(segments.iter().filter(|s| !s.is_empty()));
    path.push(INDEX_FILE);
    path
}

/// Computes the link text that points from `base`'s local copy to `target`'s
///
/// Cross-origin targets are returned as absolute URLs; they are never
/// localized. Same-origin targets become a forward-slash relative path from the
/// directory holding `base`'s local file.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmirror::url::relative_path;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let about = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(relative_path(&base, &about), "about/index.html");
///
/// let external = Url::parse("https://other.org/x").unwrap();
/// assert_eq!(relative_path(&base, &external), "https://other.org/x");
/// ```
pub fn relative_path(base: &Url, target: &Url) -> String {
    if extract_authority(base) != extract_authority(target) {
        return target.to_string();
    }

    let target_path = local_path(target);
    let base_path = local_path(base);
    let base_dir = base_path.parent().unwrap_or_else(|| Path::new(""));

    match pathdiff::diff_paths(&target_path, base_dir) {
        Some(rel) => to_link_text(&rel),
        None => format!("/{}", to_link_text(&target_path)),
    }
}

/// Returns true if a path segment carries a file extension
fn has_file_extension(segment: &str) -> bool {
    matches!(segment.rsplit_once('.'), Some((stem, ext)) if !stem.is_empty() && !ext.is_empty())
}

/// Returns true for numeric IDs and dynamic-route keywords
fn is_dynamic_segment(segment: &str) -> bool {
    let numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    numeric
        || DYNAMIC_SEGMENTS
            .iter()
            .any(|keyword| segment.eq_ignore_ascii_case(keyword))
}

/// Percent-decodes a segment for use as a file name
///
/// Segments whose decoded form would change the tree structure or the link
/// syntax stay encoded.
fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded)
            if decoded != "."
                && decoded != ".."
                && !decoded.contains(['/', '\\', '?', '#', '%']) =>
        {
            decoded.into_owned()
        }
        _ => segment.to_string(),
    }
}

/// Joins path components with forward slashes for use inside HTML and CSS
///
/// Each component is percent-encoded, so a browser decoding the link lands on
/// the on-disk name.
fn to_link_text(path: &Path) -> String {
    path.components()
        .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
