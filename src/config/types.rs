use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of link hops followed from the seed
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default number of simultaneously in-flight fetches
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Main configuration structure for a mirror run
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MirrorConfig {
    /// Root directory the mirrored tree is written under
    pub output_dir: PathBuf,

    /// Rewrite same-origin links to filesystem-relative paths
    pub convert_links: bool,

    /// File names or extensions that are fetched but never written
    pub reject: Vec<String>,

    /// Path prefixes that are never fetched
    pub exclude: Vec<String>,

    /// Maximum number of link hops from the seed
    pub max_depth: u32,

    /// Maximum number of simultaneously in-flight fetches
    pub max_concurrent: usize,

    /// Per-download bandwidth cap
    pub rate_limit: Option<RateLimit>,

    /// Whole-request timeout in seconds (0 disables)
    pub request_timeout: u64,

    /// Connection establishment timeout in seconds (0 disables)
    pub connect_timeout: u64,

    /// Overrides the browser-like User-Agent sent with every request
    pub user_agent: Option<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("mirrors"),
            convert_links: false,
            reject: Vec::new(),
            exclude: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            rate_limit: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// Bandwidth cap in bytes per second
///
/// Parsed from strings such as `"10k"` (10 KiB/s), `"5m"` (5 MiB/s) or a bare
/// byte count like `"100"`. Suffixes are case-insensitive.
///
/// # Examples
///
/// ```
/// use webmirror::config::RateLimit;
///
/// assert_eq!("10k".parse::<RateLimit>().unwrap().bytes_per_sec(), 10240);
/// assert_eq!("5M".parse::<RateLimit>().unwrap().bytes_per_sec(), 5_242_880);
/// assert_eq!("100".parse::<RateLimit>().unwrap().bytes_per_sec(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RateLimit(u64);

impl RateLimit {
    /// Creates a rate limit from a raw bytes-per-second value
    pub fn from_bytes_per_sec(bytes: u64) -> Option<Self> {
        (bytes > 0).then_some(Self(bytes))
    }

    /// Returns the limit in bytes per second
    pub fn bytes_per_sec(&self) -> u64 {
        self.0
    }
}

impl FromStr for RateLimit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRateLimit(s.to_string());
        let normalized = s.trim().to_ascii_lowercase();

        let (digits, multiplier) = if let Some(n) = normalized.strip_suffix('k') {
            (n, 1024)
        } else if let Some(n) = normalized.strip_suffix('m') {
            (n, 1024 * 1024)
        } else {
            (normalized.as_str(), 1)
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let rate: u64 = digits.parse().map_err(|_| invalid())?;
        let bytes = rate.checked_mul(multiplier).ok_or_else(invalid)?;
        Self::from_bytes_per_sec(bytes).ok_or_else(invalid)
    }
}

impl TryFrom<String> for RateLimit {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", crate::output::format_bytes(self.0))
    }
}
