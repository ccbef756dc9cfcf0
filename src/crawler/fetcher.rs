//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building the HTTP client with the browser-like header set
//! - GET requests with the body streamed through the writer chain
//! - Status classification (anything but 2xx is a failure)

use crate::config::{MirrorConfig, RateLimit};
use crate::progress::ProgressReporter;
use crate::transfer::{ProgressWriter, RateLimitedWriter};
use crate::{MirrorError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// User-Agent sent unless the configuration overrides it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Accept header sent with every request
pub const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Accept-Language header sent with every request
pub const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// A fully received response
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Complete response body
    pub body: Vec<u8>,

    /// Content-Length announced by the server, if any
    pub content_length: Option<u64>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The mirror configuration (timeouts, User-Agent override)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(MirrorError::Client)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use webmirror::config::MirrorConfig;
/// use webmirror::crawler::build_http_client;
///
/// let client = build_http_client(&MirrorConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &MirrorConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or(DEFAULT_USER_AGENT);

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .gzip(true)
        .brotli(true);

    if config.request_timeout > 0 {
        builder = builder.timeout(Duration::from_secs(config.request_timeout));
    }
    if config.connect_timeout > 0 {
        builder = builder.connect_timeout(Duration::from_secs(config.connect_timeout));
    }

    builder.build().map_err(MirrorError::Client)
}

/// Fetches one resource and buffers its body
///
/// The body is streamed through a [`ProgressWriter`] reporting under the
/// requested URL, and through a [`RateLimitedWriter`] when `rate_limit` is set.
/// The download is registered with the reporter for its whole duration.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `reporter` - Progress reporter of the run
/// * `rate_limit` - Optional per-download bandwidth cap
///
/// # Returns
///
/// * `Ok(FetchResult)` - A 2xx response with its full body
/// * `Err(MirrorError::Http)` - Transport failure or timeout
/// * `Err(MirrorError::Status)` - Non-2xx response
pub async fn fetch_resource(
    client: &Client,
    url: &Url,
    reporter: &Arc<ProgressReporter>,
    rate_limit: Option<RateLimit>,
) -> Result<FetchResult> {
    let http_error = |source| MirrorError::Http {
        url: url.to_string(),
        source,
    };

    let mut response = client
        .get(url.clone())
        .send()
        .await
        .map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let content_length = response.content_length();

    let key = url.as_str();
    reporter.register(key, content_length);

    let capacity = content_length.unwrap_or(0).min(16 * 1024 * 1024) as usize;
    let body = Vec::with_capacity(capacity);
    let received = match rate_limit {
        Some(limit) => {
            let sink = RateLimitedWriter::new(body, limit);
            let mut writer = ProgressWriter::new(sink, Arc::clone(reporter), key);
            let outcome = drain_body(&mut response, &mut writer).await;
            outcome.map(|_| writer.into_inner().into_inner())
        }
        None => {
            let mut writer = ProgressWriter::new(body, Arc::clone(reporter), key);
            let outcome = drain_body(&mut response, &mut writer).await;
            outcome.map(|_| writer.into_inner())
        }
    };
    reporter.complete(key);

    let body = received.map_err(|e| match e {
        DrainError::Http(source) => http_error(source),
        DrainError::Io(source) => MirrorError::Io(source),
    })?;

    Ok(FetchResult {
        status: status.as_u16(),
        content_type,
        body,
        content_length,
    })
}

enum DrainError {
    Http(reqwest::Error),
    Io(std::io::Error),
}

/// Copies the response body chunk by chunk into `writer`
async fn drain_body<W: AsyncWrite + Unpin>(
    response: &mut reqwest::Response,
    writer: &mut W,
) -> std::result::Result<(), DrainError> {
    while let Some(chunk) = response.chunk().await.map_err(DrainError::Http)? {
        writer.write_all(&chunk).await.map_err(DrainError::Io)?;
    }
    writer.flush().await.map_err(DrainError::Io)
}
