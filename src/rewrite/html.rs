use super::css::rewrite_css;
use super::{classify_reference, LinkContext, Rewritten};
use crate::RewriteError;
use lol_html::html_content::ContentType;
use lol_html::{element, text, HtmlRewriter, Settings};
use std::cell::RefCell;

/// Attributes holding a single URL
const LINK_ATTRIBUTES: &[&str] = &["href", "src"];

/// Rewrites the links of an HTML document
///
/// Handles `href` and `src` attributes, inline `style` attributes, and the
/// bodies of `<style>` elements. `integrity` attributes are dropped so that
/// re-hosted subresources still load.
///
/// # Arguments
///
/// * `html` - The document bytes
/// * `ctx` - Source URL, origin, and link conversion mode
///
/// # Returns
///
/// * `Ok(Rewritten)` - Rewritten document and the same-origin references
/// * `Err(RewriteError::Html)` - The streaming rewriter rejected the input
pub fn rewrite_html(html: &[u8], ctx: &LinkContext<'_>) -> Result<Rewritten, RewriteError> {
    let found = RefCell::new(Rewritten::default());
    let style_buffer = RefCell::new(String::new());
    let mut output = Vec::with_capacity(html.len());

    let mut handlers = Vec::new();
    for attr in LINK_ATTRIBUTES {
        let selector = format!("[{}]", attr);
        let found = &found;
        handlers.push(element!(selector, move |el| {
            if let Some(value) = el.get_attribute(attr) {
                let action = classify_reference(&value, ctx);
                if let Some(replacement) = found.borrow_mut().apply(action) {
                    el.set_attribute(attr, &replacement)?;
                }
            }
            Ok(())
        }));
    }

    handlers.push(element!("[style]", |el| {
        if let Some(value) = el.get_attribute("style") {
            let rewritten = rewrite_css(&value, ctx, &mut found.borrow_mut());
            if rewritten != value {
                el.set_attribute("style", &rewritten)?;
            }
        }
        Ok(())
    }));

    handlers.push(element!("[integrity]", |el| {
        el.remove_attribute("integrity");
        Ok(())
    }));

    handlers.push(text!("style", |chunk| {
        style_buffer.borrow_mut().push_str(chunk.as_str());
        if chunk.last_in_text_node() {
            let css = std::mem::take(&mut *style_buffer.borrow_mut());
            let rewritten = rewrite_css(&css, ctx, &mut found.borrow_mut());
            chunk.replace(&rewritten, ContentType::Html);
        } else {
            chunk.remove();
        }
        Ok(())
    }));

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html)
        .map_err(|e| RewriteError::Html(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| RewriteError::Html(e.to_string()))?;

    let mut result = found.into_inner();
    result.body = output;
    Ok(result)
}
