//! Link extraction and rewriting for HTML and CSS payloads
//!
//! This module handles:
//! - Choosing a rewriter from the response `Content-Type`
//! - Resolving embedded references against the document URL
//! - Rewriting same-origin references to local relative paths or absolute URLs
//! - Collecting the same-origin references as crawl candidates
//!
//! Cross-origin references are never rewritten and never collected.

mod css;
mod html;

pub use css::{extract_css_urls, rewrite_css};
pub use html::rewrite_html;

use crate::url::{extract_authority, is_analytics, relative_path, resolve_reference};
use crate::RewriteError;
use url::Url;

/// Document being rewritten and how its links are treated
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// URL the document was fetched from
    pub source: &'a Url,

    /// Host (with explicit port) that counts as same-origin
    pub base_host: &'a str,

    /// Rewrite same-origin links to local relative paths instead of absolute URLs
    pub convert_links: bool,
}

/// A rewritten payload and the references found in it
#[derive(Debug, Clone, Default)]
pub struct Rewritten {
    /// The payload after rewriting
    pub body: Vec<u8>,

    /// Same-origin references, absolute, in document order (may repeat)
    pub references: Vec<Url>,

    /// References that could not be resolved
    pub warnings: Vec<String>,
}

/// Payload families that carry rewritable links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Html,
    Css,
}

impl PayloadKind {
    /// Picks the rewriter for a `Content-Type` header value
    ///
    /// Returns None for everything that is stored byte-for-byte.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("text/html") {
            Some(Self::Html)
        } else if content_type.contains("text/css") {
            Some(Self::Css)
        } else {
            None
        }
    }
}

/// Rewrites `body` according to its kind
pub fn rewrite_payload(
    kind: PayloadKind,
    body: &[u8],
    ctx: &LinkContext<'_>,
) -> Result<Rewritten, RewriteError> {
    match kind {
        PayloadKind::Html => rewrite_html(body, ctx),
        PayloadKind::Css => {
            let text = std::str::from_utf8(body)?;
            let mut out = Rewritten::default();
            let css = rewrite_css(text, ctx, &mut out);
            out.body = css.into_bytes();
            Ok(out)
        }
    }
}

/// What to do with one embedded reference
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LinkAction {
    /// Leave the text as it is and do not crawl it
    Keep,
    /// Replace the text and crawl the target
    Local { target: Url, replacement: String },
    /// The reference could not be resolved
    Malformed(String),
}

/// Classifies a raw reference found in the document
pub(crate) fn classify_reference(raw: &str, ctx: &LinkContext<'_>) -> LinkAction {
    let target = match resolve_reference(ctx.source, raw) {
        Ok(Some(target)) => target,
        Ok(None) => return LinkAction::Keep,
        Err(e) => {
            return LinkAction::Malformed(format!(
                "Failed to resolve '{}' in {}: {}",
                raw.trim(),
                ctx.source,
                e
            ))
        }
    };

    if is_analytics(&target) {
        return LinkAction::Keep;
    }

    if extract_authority(&target).as_deref() != Some(ctx.base_host) {
        return LinkAction::Keep;
    }

    let replacement = if ctx.convert_links {
        let mut path = relative_path(ctx.source, &target);
        if let Some(fragment) = target.fragment() {
            path.push('#');
            path.push_str(fragment);
        }
        path
    } else {
        target.to_string()
    };

    LinkAction::Local {
        target,
        replacement,
    }
}

impl Rewritten {
    /// Applies a classified reference and returns the text to emit, if changed
    pub(crate) fn apply(&mut self, action: LinkAction) -> Option<String> {
        match action {
            LinkAction::Keep => None,
            LinkAction::Malformed(warning) => {
                self.warnings.push(warning);
                None
            }
            LinkAction::Local {
                target,
                replacement,
            } => {
                self.references.push(target);
                Some(replacement)
            }
        }
    }
}
