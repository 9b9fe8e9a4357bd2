//! Streaming attribute rewriter that applies localization results to a page.
//!
//! Discovery and downloading happen first; this pass only consults their
//! results, so it is synchronous, does no I/O and produces the same output for
//! the same inputs.

use std::cell::Cell;
use std::collections::HashMap;

use url::Url;

use crate::assets::{STYLESHEET_SELECTOR, image_source_url, stylesheet_url};
use crate::links::LinkContext;
use crate::profile::SiteProfile;
use crate::{Result, ThreadkeepError};

/// Inputs for one rewrite pass.
#[derive(Debug, Clone, Copy)]
pub struct RewritePlan<'a> {
    /// URL the page was fetched from; relative references resolve against it.
    pub base: &'a Url,
    pub profile: &'a SiteProfile,
    /// Absolute URL of each downloaded asset mapped to its local href.
    pub localized: &'a HashMap<String, String>,
    /// Internal link rule, or `None` to leave anchors alone.
    pub links: Option<LinkContext<'a>>,
}

/// Rewritten HTML plus how many references were changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub html: String,
    pub images: usize,
    pub stylesheets: usize,
    pub links: usize,
}

/// Rewrites image sources, stylesheet hrefs and internal links.
///
/// An image whose resolved source was downloaded gets `src` pointed at the
/// local copy and loses its lazy-load attribute. Everything not found in
/// `plan.localized` keeps its remote reference.
pub fn rewrite_page(html: &str, plan: &RewritePlan<'_>) -> Result<RewriteOutcome> {
    let images = Cell::new(0);
    let stylesheets = Cell::new(0);
    let links = Cell::new(0);
    let lazy_attribute = plan.profile.lazy_attribute.as_str();

    let mut handlers = vec![
        lol_html::element!("img", |el| {
            let lazy = el.get_attribute(lazy_attribute).map(decode);
            let src = el.get_attribute("src").map(decode);

            if let Some(url) = image_source_url(plan.base, lazy.as_deref(), src.as_deref(), plan.profile)
                && let Some(local) = plan.localized.get(url.as_str())
            {
                el.set_attribute("src", local)?;
                el.remove_attribute(lazy_attribute);
                images.set(images.get() + 1);
            }
            Ok(())
        }),
        lol_html::element!(STYLESHEET_SELECTOR, |el| {
            if let Some(href) = el.get_attribute("href").map(decode)
                && let Some(url) = stylesheet_url(plan.base, &href)
                && let Some(local) = plan.localized.get(url.as_str())
            {
                el.set_attribute("href", local)?;
                stylesheets.set(stylesheets.get() + 1);
            }
            Ok(())
        }),
    ];

    if let Some(ctx) = plan.links.as_ref() {
        handlers.push(lol_html::element!("a[href]", |el| {
            if let Some(href) = el.get_attribute("href").map(decode)
                && let Some(local) = ctx.local_href(&href)
            {
                el.set_attribute("href", &local)?;
                links.set(links.get() + 1);
            }
            Ok(())
        }));
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| ThreadkeepError::HtmlParseError(e.to_string()))?;
    rewriter.end().map_err(|e| ThreadkeepError::HtmlParseError(e.to_string()))?;

    let html = String::from_utf8(output).map_err(|e| ThreadkeepError::HtmlParseError(e.to_string()))?;

    Ok(RewriteOutcome { html, images: images.get(), stylesheets: stylesheets.get(), links: links.get() })
}

/// Raw attribute values still carry entity references (`&amp;`); discovery
/// sees them decoded, so lookups must too.
fn decode(value: String) -> String {
    html_escape::decode_html_entities(&value).into_owned()
}
