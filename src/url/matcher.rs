use url::Url;

/// Path fragment whose resources are never crawled
const SCRIPT_DIR: &str = "/js/";

/// Outcome of matching a URL against the configured filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    /// Fetch, parse, and save
    Allow,
    /// Fetch and parse for children, but do not write to disk
    FetchOnly,
    /// Path falls under an exclude prefix; never fetched
    Excluded,
    /// Path falls under the hard-coded script directory; never fetched
    Script,
}

impl FilterVerdict {
    /// Returns true if the resource may be fetched at all
    pub fn should_fetch(&self) -> bool {
        matches!(self, Self::Allow | Self::FetchOnly)
    }

    /// Returns true if the fetched resource may be written to disk
    pub fn should_save(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Reject and exclude filters applied before a resource is fetched
///
/// Matching is case-insensitive throughout.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmirror::url::{FilterVerdict, ResourceFilter};
///
/// let filter = ResourceFilter::new(&["jpg".to_string()], &["/private".to_string()]);
///
/// let img = Url::parse("https://example.com/img/cat.JPG").unwrap();
/// assert_eq!(filter.check(&img), FilterVerdict::FetchOnly);
///
/// let private = Url::parse("https://example.com/Private/a.html").unwrap();
/// assert_eq!(filter.check(&private), FilterVerdict::Excluded);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    reject: Vec<String>,
    exclude: Vec<String>,
}

impl ResourceFilter {
    /// Builds a filter from raw reject and exclude entries
    ///
    /// Reject entries are compared against the file name and the extension
    /// (a leading `.` is ignored). Exclude entries are path prefixes; leading
    /// and trailing slashes are ignored.
    pub fn new(reject: &[String], exclude: &[String]) -> Self {
        let reject = reject
            .iter()
            .map(|r| r.trim().trim_start_matches('.').to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        let exclude = exclude
            .iter()
            .map(|e| e.trim().trim_matches('/').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { reject, exclude }
    }

    /// Classifies a URL
    ///
    /// The script rule wins over exclusion, exclusion wins over rejection.
    pub fn check(&self, url: &Url) -> FilterVerdict {
        let path = url.path();

        if path.contains(SCRIPT_DIR) {
            return FilterVerdict::Script;
        }

        if self.is_excluded(path) {
            return FilterVerdict::Excluded;
        }

        if self.is_rejected(path) {
            return FilterVerdict::FetchOnly;
        }

        FilterVerdict::Allow
    }

    fn is_excluded(&self, path: &str) -> bool {
        let normalized = path.trim_matches('/').to_lowercase();
        self.exclude
            .iter()
            .any(|prefix| normalized.starts_with(prefix.as_str()))
    }

    fn is_rejected(&self, path: &str) -> bool {
        if self.reject.is_empty() {
            return false;
        }

        let filename = match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => "index.html".to_string(),
        };

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty());

        self.reject
            .iter()
            .any(|r| *r == filename || extension.is_some_and(|ext| ext == r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    fn filter(reject: &[&str], exclude: &[&str]) -> ResourceFilter {
        let reject: Vec<String> = reject.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        ResourceFilter::new(&reject, &exclude)
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let f = ResourceFilter::default();
        assert_eq!(f.check(&url("/")), FilterVerdict::Allow);
        assert_eq!(f.check(&url("/a/b.png")), FilterVerdict::Allow);
    }

    #[test]
    fn test_script_directory_is_never_fetched() {
        let f = ResourceFilter::default();
        assert_eq!(f.check(&url("/js/app.js")), FilterVerdict::Script);
        assert_eq!(f.check(&url("/static/js/app.js")), FilterVerdict::Script);
        assert_eq!(f.check(&url("/app.js")), FilterVerdict::Allow);
        assert!(!FilterVerdict::Script.should_fetch());
    }

    #[test]
    fn test_reject_by_extension_case_insensitive() {
        let f = filter(&["gif", ".JPG"], &[]);
        assert_eq!(f.check(&url("/a.gif")), FilterVerdict::FetchOnly);
        assert_eq!(f.check(&url("/b.GIF")), FilterVerdict::FetchOnly);
        assert_eq!(f.check(&url("/c.jpg")), FilterVerdict::FetchOnly);
        assert_eq!(f.check(&url("/d.png")), FilterVerdict::Allow);
    }

    #[test]
    fn test_reject_by_filename() {
        let f = filter(&["robots.txt", "index.html"], &[]);
        assert_eq!(f.check(&url("/robots.txt")), FilterVerdict::FetchOnly);
        assert_eq!(f.check(&url("/")), FilterVerdict::FetchOnly);
        assert_eq!(f.check(&url("/about.txt")), FilterVerdict::Allow);
    }

    #[test]
    fn test_rejected_resources_are_still_fetched() {
        assert!(FilterVerdict::FetchOnly.should_fetch());
        assert!(!FilterVerdict::FetchOnly.should_save());
    }

    #[test]
    fn test_exclude_prefix() {
        let f = filter(&[], &["/assets/", "Private"]);
        assert_eq!(f.check(&url("/assets/x.css")), FilterVerdict::Excluded);
        assert_eq!(f.check(&url("/private/a")), FilterVerdict::Excluded);
        assert_eq!(f.check(&url("/PRIVATE")), FilterVerdict::Excluded);
        assert_eq!(f.check(&url("/public/a")), FilterVerdict::Allow);
        assert!(!FilterVerdict::Excluded.should_fetch());
    }

    #[test]
    fn test_exclude_wins_over_reject() {
        let f = filter(&["css"], &["/assets"]);
        assert_eq!(f.check(&url("/assets/x.css")), FilterVerdict::Excluded);
    }

    #[test]
    fn test_blank_entries_ignored() {
        let f = filter(&[""], &["/"]);
        assert_eq!(f.check(&url("/anything")), FilterVerdict::Allow);
    }
}
