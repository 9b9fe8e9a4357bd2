//! Asset discovery: which images and stylesheets a page references, where
//! each one lands on disk, and how the page refers to the local copy.

use std::collections::HashSet;

use url::Url;

use crate::Result;
use crate::localize::LocalizeOptions;
use crate::parse::{Document, Element};
use crate::profile::SiteProfile;
use crate::thread::sanitize_folder_name;

/// Selector for stylesheet links; `rel` is a token list.
pub const STYLESHEET_SELECTOR: &str = r#"link[rel~="stylesheet"][href]"#;

/// What kind of asset a reference is, which decides its folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Avatar,
    Stylesheet,
}

impl AssetKind {
    /// Folder relative to the archive root.
    pub fn dir(self) -> &'static str {
        match self {
            AssetKind::Image => "images",
            AssetKind::Avatar => "images/avatars",
            AssetKind::Stylesheet => "css",
        }
    }

    /// Whether downloads of this kind carry a `Referer` header.
    pub fn sends_referer(self) -> bool {
        matches!(self, AssetKind::Image | AssetKind::Avatar)
    }
}

/// One asset to download for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Absolute source URL.
    pub url: Url,
    pub kind: AssetKind,
    /// File name under the kind's folder.
    pub file_name: String,
}

impl AssetRef {
    /// Reference to the local copy from a file in `html/`.
    ///
    /// File names keep their percent escapes on disk, so the `%` itself has to
    /// be escaped for the browser to find the file.
    pub fn local_href(&self) -> String {
        format!("../{}/{}", self.kind.dir(), self.file_name.replace('%', "%25"))
    }
}

/// The unique assets of one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPlan {
    pub assets: Vec<AssetRef>,
    /// References that were recognised but will not be downloaded.
    pub skipped: usize,
}

/// File name for a URL: its last path segment, made safe for the filesystem.
///
/// Returns `None` for URLs whose path ends in `/` or has no segments.
pub fn local_file_name(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }

    let name = sanitize_folder_name(segment);
    if name == "." || name == ".." { None } else { Some(name) }
}

/// Resolves an image's source URL.
///
/// The lazy-load value wins over `src` when present and non-blank. Returns
/// `None` when neither resolves to an http(s) URL or when the URL is a known
/// placeholder.
pub fn image_source_url(base: &Url, lazy: Option<&str>, src: Option<&str>, profile: &SiteProfile) -> Option<Url> {
    let raw = [lazy, src]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())?;

    let url = resolve_http(base, raw)?;
    if profile.is_placeholder(url.as_str()) { None } else { Some(url) }
}

/// Resolves a stylesheet `href`.
pub fn stylesheet_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    resolve_http(base, href)
}

/// Folder classification for an image URL.
pub fn classify_image(url: &Url, profile: &SiteProfile, split_avatars: bool) -> AssetKind {
    if split_avatars && profile.is_avatar(url.as_str()) {
        AssetKind::Avatar
    } else {
        AssetKind::Image
    }
}

/// Collects the unique assets of a page.
///
/// Each distinct URL appears once, at its first occurrence. Images and
/// stylesheets are only collected when their pass is enabled in `options`.
pub fn discover_assets(html: &str, base: &Url, profile: &SiteProfile, options: &LocalizeOptions) -> Result<AssetPlan> {
    let doc = Document::parse(html)?;
    let mut plan = AssetPlan::default();
    let mut seen = HashSet::new();

    if options.localize_images {
        for img in doc.select("img")? {
            let Some(url) = image_url_for(&img, base, profile) else {
                if img.attr("src").is_some() || img.attr(&profile.lazy_attribute).is_some() {
                    plan.skipped += 1;
                }
                continue;
            };
            let kind = classify_image(&url, profile, options.split_avatars);
            push_asset(&mut plan, &mut seen, url, kind);
        }
    }

    if options.localize_stylesheets {
        for link in doc.select(STYLESHEET_SELECTOR)? {
            match link.attr("href").and_then(|href| stylesheet_url(base, href)) {
                Some(url) => push_asset(&mut plan, &mut seen, url, AssetKind::Stylesheet),
                None => plan.skipped += 1,
            }
        }
    }

    Ok(plan)
}

fn image_url_for(img: &Element<'_>, base: &Url, profile: &SiteProfile) -> Option<Url> {
    image_source_url(base, img.attr(&profile.lazy_attribute), img.attr("src"), profile)
}

fn push_asset(plan: &mut AssetPlan, seen: &mut HashSet<String>, url: Url, kind: AssetKind) {
    if !seen.insert(url.as_str().to_string()) {
        return;
    }

    match local_file_name(&url) {
        Some(file_name) => plan.assets.push(AssetRef { url, kind, file_name }),
        None => {
            tracing::debug!(%url, "skipping asset without a file name");
            plan.skipped += 1;
        }
    }
}

fn resolve_http(base: &Url, raw: &str) -> Option<Url> {
    let url = base.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("https://www.example.com/foro/off/hilo-1/3").unwrap()
    }

    #[rstest]
    #[case("https://cdn.example.com/img/a.png", Some("a.png"))]
    #[case("https://cdn.example.com/img/a.png?v=3", Some("a.png"))]
    #[case("https://cdn.example.com/img/a%20b.png", Some("a%20b.png"))]
    #[case("https://cdn.example.com/img/a:b.png", Some("a_b.png"))]
    #[case("https://cdn.example.com/img/", None)]
    #[case("https://cdn.example.com", None)]
    fn test_local_file_name(#[case] url: &str, #[case] expected: Option<&str>) {
        let url = Url::parse(url).unwrap();
        assert_eq!(local_file_name(&url).as_deref(), expected);
    }

    #[test]
    fn test_local_href_escapes_percent() {
        let asset = AssetRef {
            url: Url::parse("https://cdn.example.com/a%20b.png").unwrap(),
            kind: AssetKind::Avatar,
            file_name: "a%20b.png".to_string(),
        };
        assert_eq!(asset.local_href(), "../images/avatars/a%2520b.png");
    }

    #[test]
    fn test_image_source_prefers_lazy_attribute() {
        let profile = SiteProfile::default();
        let url = image_source_url(&base(), Some("/img/real.jpg"), Some("/style/pix.gif"), &profile).unwrap();
        assert_eq!(url.as_str(), "https://www.example.com/img/real.jpg");

        let url = image_source_url(&base(), Some("  "), Some("local.png"), &profile).unwrap();
        assert_eq!(url.as_str(), "https://www.example.com/foro/off/hilo-1/local.png");
    }

    #[rstest]
    #[case::placeholder(None, Some("/style/img/pix.gif"))]
    #[case::missing(None, None)]
    #[case::data_uri(None, Some("data:image/png;base64,AAAA"))]
    #[case::blank(Some(""), Some(" "))]
    fn test_image_source_skipped(#[case] lazy: Option<&str>, #[case] src: Option<&str>) {
        assert_eq!(image_source_url(&base(), lazy, src, &SiteProfile::default()), None);
    }

    #[test]
    fn test_classify_image() {
        let profile = SiteProfile::default();
        let avatar = Url::parse("https://www.example.com/img/users/avatar/u1.jpg").unwrap();
        let photo = Url::parse("https://i.imgur.com/x.jpg").unwrap();

        assert_eq!(classify_image(&avatar, &profile, true), AssetKind::Avatar);
        assert_eq!(classify_image(&avatar, &profile, false), AssetKind::Image);
        assert_eq!(classify_image(&photo, &profile, true), AssetKind::Image);
    }

    #[test]
    fn test_discover_assets_dedups_in_document_order() {
        let html = r#"
            <html><head>
                <link rel="stylesheet" href="/css/style.css">
                <link rel="alternate stylesheet" href="/css/dark.css">
                <link rel="icon" href="/favicon.ico">
            </head><body>
                <img src="/style/pix.gif" data-src="/img/users/avatar/u1.jpg">
                <img src="https://i.imgur.com/cat.jpg">
                <img src="https://i.imgur.com/cat.jpg">
                <img src="/style/pix.gif">
                <img alt="no source">
            </body></html>
        "#;

        let plan = discover_assets(html, &base(), &SiteProfile::default(), &LocalizeOptions::default()).unwrap();
        let names: Vec<_> = plan.assets.iter().map(|a| (a.kind, a.file_name.as_str())).collect();

        assert_eq!(
            names,
            vec![
                (AssetKind::Avatar, "u1.jpg"),
                (AssetKind::Image, "cat.jpg"),
                (AssetKind::Stylesheet, "style.css"),
                (AssetKind::Stylesheet, "dark.css"),
            ]
        );
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_discover_assets_respects_disabled_passes() {
        let html = r#"<link rel="stylesheet" href="/s.css"><img src="/a.png">"#;
        let options = LocalizeOptions { localize_images: false, ..Default::default() };

        let plan = discover_assets(html, &base(), &SiteProfile::default(), &options).unwrap();
        assert_eq!(plan.assets.len(), 1);
        assert_eq!(plan.assets[0].kind, AssetKind::Stylesheet);
    }
}
