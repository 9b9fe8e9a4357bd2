//! Thread metadata: page count, title, slug and page URLs.
//!
//! All readers here are total. A page without the expected markup (including
//! the empty document produced by a failed fetch) yields one page and no
//! title instead of an error.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::parse::Document;
use crate::profile::SiteProfile;

/// Characters that are invalid in folder names on common filesystems.
static INVALID_FOLDER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("static regex"));

/// Folder name used when neither a title nor a slug is available.
pub const FALLBACK_FOLDER_NAME: &str = "thread";

/// Everything known about a thread before its pages are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    /// Root URL (page 1).
    pub url: Url,
    /// Title from the page metadata, if any.
    pub title: Option<String>,
    /// Last path segment of the root URL.
    pub slug: Option<String>,
    /// Sanitized folder name for the archive root.
    pub folder_name: String,
    /// Number of pages, at least 1.
    pub page_count: u32,
}

impl ThreadInfo {
    /// Reads thread metadata from the first page.
    pub fn from_first_page(url: Url, doc: &Document, profile: &SiteProfile) -> Self {
        let title = thread_title(doc, profile);
        let slug = thread_slug(&url);
        let folder_name = folder_name(title.as_deref(), slug.as_deref());
        let page_count = total_pages(doc, profile);

        Self { url, title, slug, folder_name, page_count }
    }

    /// URL of page `page` (1-based).
    pub fn page_url(&self, page: u32) -> Url {
        page_url(&self.url, page)
    }

    /// Title for display, falling back to the folder name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.folder_name)
    }
}

/// Reads the last page number from the bottom pagination panel.
///
/// The panel ends with a "next" anchor, so the last page number is the text
/// of the second-to-last anchor. Returns 1 when the panel is missing, has
/// fewer than two anchors, or that text is not a positive integer.
pub fn total_pages(doc: &Document, profile: &SiteProfile) -> u32 {
    let Ok(anchors) = doc.select(&profile.pagination_selector) else {
        return 1;
    };

    if anchors.len() < 2 {
        return 1;
    }

    anchors[anchors.len() - 2]
        .text()
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Reads the thread title from the profile's title meta tag.
pub fn thread_title(doc: &Document, profile: &SiteProfile) -> Option<String> {
    doc.meta_content(&profile.title_meta)
}

/// Replaces `\ / * ? : " < > |` with `_`.
pub fn sanitize_folder_name(name: &str) -> String {
    INVALID_FOLDER_CHARS.replace_all(name, "_").into_owned()
}

/// Last non-empty path segment of the thread URL.
pub fn thread_slug(url: &Url) -> Option<String> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Chooses the archive folder name: sanitized title, else slug, else
/// [`FALLBACK_FOLDER_NAME`].
pub fn folder_name(title: Option<&str>, slug: Option<&str>) -> String {
    [title, slug]
        .into_iter()
        .flatten()
        .map(|name| sanitize_folder_name(name.trim()))
        .find(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| FALLBACK_FOLDER_NAME.to_string())
}

/// URL of page `page`: the root for page 1, `<root>/<page>` otherwise.
pub fn page_url(root: &Url, page: u32) -> Url {
    if page <= 1 {
        return root.clone();
    }

    let mut url = root.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(&page.to_string());
    }
    url
}
