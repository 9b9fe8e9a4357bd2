//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types used to read a
//! forum page: thread metadata, pagination anchors, and the image and
//! stylesheet references that get localized. Mutation is not done on this
//! tree; see [`crate::rewrite`] for the attribute rewriting pass.
//!
//! # Example
//!
//! ```rust
//! use threadkeep_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><meta property="og:title" content="Off-topic: cats"></head>
//!         <body><img src="/a.png"><img data-src="/b.png"></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.meta_content("og:title"), Some("Off-topic: cats".to_string()));
//! assert_eq!(doc.select("img").unwrap().len(), 2);
//! ```

use scraper::{Html, Selector};

use crate::{Result, ThreadkeepError};

/// Represents a parsed HTML document.
///
/// A Document wraps a page and provides methods for querying elements using
/// CSS selectors and reading `<meta>` values.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: malformed markup is repaired the way a browser
    /// would, so this only fails if the input cannot be represented at all.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// An empty placeholder document.
    ///
    /// Stands in for pages that could not be fetched. Every query on it comes
    /// back empty, so metadata readers fall through to their defaults.
    pub fn empty() -> Self {
        Self { html: Html::parse_document("") }
    }

    /// Serializes the whole document back to HTML.
    ///
    /// The output is the parser's normalized form, so attribute quoting and
    /// implied elements may differ from the bytes originally received.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadkeepError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Reads the `content` of a `<meta>` tag matched by `property` or `name`.
    ///
    /// Open Graph tags use `property`, but plenty of forum templates emit
    /// them with `name`, so both are checked. Blank values count as absent.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        for attr in ["property", "name"] {
            let selector = format!("meta[{}=\"{}\"]", attr, key);
            if let Ok(elements) = self.select(&selector)
                && let Some(content) = elements.iter().find_map(|el| el.attr("content"))
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }

        None
    }
}

/// A wrapper around scraper's ElementRef with explicit attribute accessors.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute, or `None` if it is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ThreadkeepError::HtmlParseError(format!("Invalid selector: {}", e)))
}
