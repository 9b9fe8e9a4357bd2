//! The archive run: thread metadata, output layout and the page loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use threadkeep_core::{ArchiveConfig, Archiver, ArchiveEvent, parse_http_url};
//!
//! # async fn example() -> threadkeep_core::Result<()> {
//! let url = parse_http_url("https://www.example.com/foro/off-topic/hilo-123")?;
//! let config = ArchiveConfig::builder(url).output_dir("backups").build();
//!
//! let summary = Archiver::new(config)?
//!     .run(|event| {
//!         if let ArchiveEvent::PageStarted { page, total, .. } = event {
//!             println!("page {}/{}", page, total);
//!         }
//!     })
//!     .await?;
//! println!("saved {} pages to {}", summary.pages_written, summary.root.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use url::Url;

use crate::Result;
use crate::fetch::{FetchConfig, HttpSession};
use crate::layout::OutputLayout;
use crate::localize::{LocalizeOptions, LocalizeReport, PageLocalizer};
use crate::profile::SiteProfile;
use crate::thread::{ThreadInfo, folder_name};

/// Everything an archive run needs.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Thread root URL (page 1).
    pub thread_url: Url,
    /// Parent directory of the archive root.
    pub output_dir: PathBuf,
    /// Folder name override; the thread title is used otherwise.
    pub folder_name: Option<String>,
    pub fetch: FetchConfig,
    pub profile: SiteProfile,
    pub options: LocalizeOptions,
    /// Stop after this many pages.
    pub max_pages: Option<u32>,
}

impl ArchiveConfig {
    /// Creates a builder with default values for `thread_url`.
    pub fn builder(thread_url: Url) -> ArchiveConfigBuilder {
        ArchiveConfigBuilder::new(thread_url)
    }
}

/// Builder for ArchiveConfig.
///
/// ```rust
/// use threadkeep_core::{ArchiveConfig, LocalizeOptions, parse_http_url};
///
/// let url = parse_http_url("https://www.example.com/foro/hilo-1").unwrap();
/// let config = ArchiveConfig::builder(url)
///     .output_dir("/tmp/backups")
///     .max_pages(5)
///     .options(LocalizeOptions { split_avatars: false, ..Default::default() })
///     .build();
/// assert_eq!(config.max_pages, Some(5));
/// ```
pub struct ArchiveConfigBuilder {
    config: ArchiveConfig,
}

impl ArchiveConfigBuilder {
    pub fn new(thread_url: Url) -> Self {
        Self {
            config: ArchiveConfig {
                thread_url,
                output_dir: PathBuf::from("."),
                folder_name: None,
                fetch: FetchConfig::default(),
                profile: SiteProfile::default(),
                options: LocalizeOptions::default(),
                max_pages: None,
            },
        }
    }

    pub fn output_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.output_dir = value.into();
        self
    }

    pub fn folder_name(mut self, value: impl Into<String>) -> Self {
        self.config.folder_name = Some(value.into());
        self
    }

    pub fn fetch(mut self, value: FetchConfig) -> Self {
        self.config.fetch = value;
        self
    }

    pub fn profile(mut self, value: SiteProfile) -> Self {
        self.config.profile = value;
        self
    }

    pub fn options(mut self, value: LocalizeOptions) -> Self {
        self.config.options = value;
        self
    }

    pub fn max_pages(mut self, value: u32) -> Self {
        self.config.max_pages = Some(value);
        self
    }

    pub fn build(self) -> ArchiveConfig {
        self.config
    }
}

/// Progress notifications from [`Archiver::run`].
#[derive(Debug)]
pub enum ArchiveEvent<'a> {
    /// Metadata read and output folders created.
    ThreadResolved { thread: &'a ThreadInfo, root: &'a Path, pages: u32 },
    /// A page is about to be fetched.
    PageStarted { page: u32, total: u32, url: &'a Url },
    /// A page has been written to disk.
    PageWritten { page: u32, total: u32, path: &'a Path, report: &'a LocalizeReport },
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub thread: ThreadInfo,
    /// Archive root folder.
    pub root: PathBuf,
    pub pages_written: u32,
    /// Totals over all pages.
    pub report: LocalizeReport,
}

/// Runs archives with one HTTP session.
#[derive(Debug)]
pub struct Archiver {
    config: ArchiveConfig,
    session: HttpSession,
}

impl Archiver {
    /// Creates an archiver with a session built from `config.fetch`.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        let session = HttpSession::new(config.fetch.clone())?;
        Ok(Self { config, session })
    }

    /// Fetches page 1 and reads the thread metadata from it.
    ///
    /// Returns the page's serialized HTML too so the page loop does not fetch
    /// it a second time.
    pub async fn resolve_thread(&self) -> (ThreadInfo, String) {
        let url = &self.config.thread_url;
        let doc = self.session.fetch_page(url.as_str()).await;

        let mut thread = ThreadInfo::from_first_page(url.clone(), &doc, &self.config.profile);
        if let Some(name) = &self.config.folder_name {
            thread.folder_name = folder_name(Some(name.as_str()), thread.slug.as_deref());
        }

        (thread, doc.as_string())
    }

    /// Archives every page of the thread, one after another.
    ///
    /// Unreachable pages and assets are logged and do not stop the run;
    /// filesystem errors do.
    pub async fn run(&self, mut on_event: impl FnMut(ArchiveEvent<'_>)) -> Result<ArchiveSummary> {
        let (thread, first_page) = self.resolve_thread().await;
        let pages = self
            .config
            .max_pages
            .map_or(thread.page_count, |max| thread.page_count.min(max.max(1)));

        let layout = OutputLayout::new(
            self.config.output_dir.join(&thread.folder_name),
            self.config.options.split_avatars,
        );
        layout.create()?;

        tracing::info!(
            title = thread.display_title(),
            pages,
            root = %layout.root().display(),
            "archiving thread"
        );
        on_event(ArchiveEvent::ThreadResolved { thread: &thread, root: layout.root(), pages });

        let localizer = PageLocalizer {
            session: &self.session,
            layout: &layout,
            profile: &self.config.profile,
            options: &self.config.options,
            thread_url: &thread.url,
            slug: thread.slug.as_deref(),
        };

        let mut first_page = Some(first_page);
        let mut report = LocalizeReport::default();

        for page in 1..=pages {
            let page_url = thread.page_url(page);
            on_event(ArchiveEvent::PageStarted { page, total: pages, url: &page_url });

            let html = match first_page.take() {
                Some(html) if page == 1 => html,
                _ => self.session.fetch_page(page_url.as_str()).await.as_string(),
            };

            let localized = localizer.localize(&html, &page_url).await?;
            let path = layout.write_page(page, &localized.html)?;

            tracing::info!(
                page,
                path = %path.display(),
                downloaded = localized.report.downloaded,
                failed = localized.report.failed,
                "page written"
            );
            on_event(ArchiveEvent::PageWritten { page, total: pages, path: &path, report: &localized.report });
            report += localized.report;
        }

        Ok(ArchiveSummary { root: layout.root().to_path_buf(), thread, pages_written: pages, report })
    }
}
