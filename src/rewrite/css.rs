use super::{classify_reference, LinkContext, Rewritten};
use regex::{Captures, Regex};
use std::sync::OnceLock;

static CSS_URL: OnceLock<Regex> = OnceLock::new();

fn css_url_regex() -> &'static Regex {
    CSS_URL.get_or_init(|| {
        Regex::new(r#"url\(\s*(['"]?)([^'")]+)(['"]?)\s*\)"#).expect("compile CSS_URL")
    })
}

/// Returns every `url(...)` target in a stylesheet, unresolved, in order
///
/// # Example
///
/// ```
/// use webmirror::rewrite::extract_css_urls;
///
/// let css = r#"a { background: url("bg.png") } b { src: url(font.woff) }"#;
/// assert_eq!(extract_css_urls(css), vec!["bg.png", "font.woff"]);
/// ```
pub fn extract_css_urls(css: &str) -> Vec<&str> {
    css_url_regex()
        .captures_iter(css)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().trim())
        .collect()
}

/// Rewrites the `url(...)` references of a stylesheet fragment
///
/// Same-origin targets are pushed onto `out.references` whether or not links
/// are converted. The text only changes when link conversion is on; the
/// original quoting style is kept.
pub fn rewrite_css(css: &str, ctx: &LinkContext<'_>, out: &mut Rewritten) -> String {
    css_url_regex()
        .replace_all(css, |caps: &Captures<'_>| {
            let raw = caps[2].trim();
            match out.apply(classify_reference(raw, ctx)) {
                Some(replacement) if ctx.convert_links => {
                    let open = &caps[1];
                    let close = &caps[3];
                    format!("url({}{}{})", open, replacement, close)
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
