//! Page localization: download a page's assets and rewrite it to use them.
//!
//! One call handles one page in three steps: discover the unique image and
//! stylesheet URLs, download each once into the archive layout, then rewrite
//! images, stylesheets and internal links in a single streaming pass.
//! Download failures only leave the affected reference remote; filesystem
//! errors abort.

use std::collections::HashMap;
use std::fs;
use std::ops::AddAssign;

use url::Url;

use crate::assets::{AssetRef, discover_assets};
use crate::fetch::HttpSession;
use crate::layout::OutputLayout;
use crate::links::LinkContext;
use crate::profile::SiteProfile;
use crate::rewrite::{RewritePlan, rewrite_page};
use crate::{Result, ThreadkeepError};

/// Switches for the localization passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeOptions {
    /// Download images and point `img` elements at them.
    pub localize_images: bool,
    /// Download stylesheets and point `link` elements at them.
    pub localize_stylesheets: bool,
    /// Store avatars under `images/avatars` instead of `images`.
    pub split_avatars: bool,
    /// Point same-thread page links at the saved page files.
    pub rewrite_links: bool,
    /// Also map links to the bare thread URL onto page 1.
    pub link_first_page: bool,
}

impl Default for LocalizeOptions {
    fn default() -> Self {
        Self {
            localize_images: true,
            localize_stylesheets: true,
            split_avatars: true,
            rewrite_links: true,
            link_first_page: true,
        }
    }
}

/// Counters for one localized page (or, summed, a whole archive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalizeReport {
    /// Assets saved to disk.
    pub downloaded: usize,
    /// Assets whose download failed; their references stay remote.
    pub failed: usize,
    /// References ignored: placeholders, unresolvable or nameless URLs.
    pub skipped: usize,
    pub images_rewritten: usize,
    pub stylesheets_rewritten: usize,
    pub links_rewritten: usize,
}

impl AddAssign for LocalizeReport {
    fn add_assign(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.images_rewritten += other.images_rewritten;
        self.stylesheets_rewritten += other.stylesheets_rewritten;
        self.links_rewritten += other.links_rewritten;
    }
}

/// A page after localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedPage {
    pub html: String,
    pub report: LocalizeReport,
}

/// Localizes pages of one thread into one layout.
#[derive(Debug, Clone, Copy)]
pub struct PageLocalizer<'a> {
    pub session: &'a HttpSession,
    pub layout: &'a OutputLayout,
    pub profile: &'a SiteProfile,
    pub options: &'a LocalizeOptions,
    /// Thread root URL (page 1).
    pub thread_url: &'a Url,
    /// Marker identifying same-thread links; link rewriting is off without it.
    pub slug: Option<&'a str>,
}

impl PageLocalizer<'_> {
    /// Downloads the assets of `html` and returns the rewritten page.
    ///
    /// `page_url` is where the page was fetched from; relative references
    /// resolve against it and links back to it are left alone.
    pub async fn localize(&self, html: &str, page_url: &Url) -> Result<LocalizedPage> {
        let plan = discover_assets(html, page_url, self.profile, self.options)?;
        let mut report = LocalizeReport { skipped: plan.skipped, ..Default::default() };
        let mut localized = HashMap::new();

        for asset in &plan.assets {
            match self.fetch_asset(asset).await {
                Ok(()) => {
                    localized.insert(asset.url.to_string(), asset.local_href());
                    report.downloaded += 1;
                }
                Err(ThreadkeepError::WriteError(e)) => return Err(ThreadkeepError::WriteError(e)),
                Err(e) => {
                    tracing::warn!(url = %asset.url, error = %e, "failed to download asset");
                    report.failed += 1;
                }
            }
        }

        let links = match self.slug {
            Some(slug) if self.options.rewrite_links => Some(LinkContext {
                page_url,
                thread_url: self.thread_url,
                slug,
                profile: self.profile,
                link_first_page: self.options.link_first_page,
            }),
            _ => None,
        };
        let rewrite = RewritePlan { base: page_url, profile: self.profile, localized: &localized, links };

        let html = match rewrite_page(html, &rewrite) {
            Ok(outcome) => {
                report.images_rewritten = outcome.images;
                report.stylesheets_rewritten = outcome.stylesheets;
                report.links_rewritten = outcome.links;
                outcome.html
            }
            Err(e) => {
                tracing::warn!(url = %page_url, error = %e, "rewrite failed, keeping page as fetched");
                html.to_string()
            }
        };

        Ok(LocalizedPage { html, report })
    }

    async fn fetch_asset(&self, asset: &AssetRef) -> Result<()> {
        let referer = asset.kind.sends_referer().then_some(asset.url.as_str());
        let bytes = self.session.download(&asset.url, referer).await?;

        let path = self.layout.asset_path(asset);
        fs::write(&path, &bytes)?;

        tracing::debug!(url = %asset.url, path = %path.display(), bytes = bytes.len(), "saved asset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_enable_everything() {
        let options = LocalizeOptions::default();
        assert!(options.localize_images);
        assert!(options.localize_stylesheets);
        assert!(options.split_avatars);
        assert!(options.rewrite_links);
        assert!(options.link_first_page);
    }

    #[test]
    fn test_report_sums() {
        let mut total = LocalizeReport::default();
        total += LocalizeReport { downloaded: 2, failed: 1, links_rewritten: 4, ..Default::default() };
        total += LocalizeReport { downloaded: 3, skipped: 2, images_rewritten: 3, ..Default::default() };

        assert_eq!(total.downloaded, 5);
        assert_eq!(total.failed, 1);
        assert_eq!(total.skipped, 2);
        assert_eq!(total.images_rewritten, 3);
        assert_eq!(total.links_rewritten, 4);
    }
}
