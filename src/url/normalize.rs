use super::domain::extract_authority;
use crate::UrlError;
use url::Url;

/// Parses and validates a seed URL
///
/// The seed must be an absolute `http` or `https` URL with a host.
///
/// # Examples
///
/// ```
/// use webmirror::url::parse_seed;
///
/// assert!(parse_seed("https://example.com/").is_ok());
/// assert!(parse_seed("example.com").is_err());
/// assert!(parse_seed("ftp://example.com/").is_err());
/// ```
pub fn parse_seed(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim())?;

    if !is_fetchable_scheme(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true for schemes the fetcher can retrieve
pub fn is_fetchable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Computes the deduplication key of a URL
///
/// The key is the authority (host plus explicit port) followed by the path.
/// Scheme, query and fragment are dropped: none of them change where the
/// resource lands in the mirror tree, so references differing only there
/// name the same mirrored resource.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmirror::url::canonical_key;
///
/// let a = Url::parse("https://example.com/page?ref=1#top").unwrap();
/// let b = Url::parse("https://example.com/page").unwrap();
/// assert_eq!(canonical_key(&a), canonical_key(&b));
/// assert_eq!(canonical_key(&b), "example.com/page");
/// ```
pub fn canonical_key(url: &Url) -> String {
    let authority = extract_authority(url).unwrap_or_default();
    format!("{}{}", authority, url.path())
}
