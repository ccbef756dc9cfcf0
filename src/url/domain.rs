use url::Url;

/// Extracts the origin authority of a URL: lowercase host plus explicit port
///
/// Two URLs are same-origin for mirroring purposes when their authorities are
/// equal. Default ports are omitted by the URL parser, so
/// `https://example.com:443/` and `https://example.com/` share an authority.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmirror::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true when `url` belongs to the origin identified by `authority`
pub fn is_same_origin(url: &Url, authority: &str) -> bool {
    extract_authority(url).is_some_and(|a| a == authority)
}
