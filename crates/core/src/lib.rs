pub mod archive;
pub mod assets;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod links;
pub mod localize;
pub mod parse;
pub mod profile;
pub mod rewrite;
pub mod thread;

pub use archive::{ArchiveConfig, ArchiveConfigBuilder, ArchiveEvent, ArchiveSummary, Archiver};
pub use assets::{AssetKind, AssetPlan, AssetRef, discover_assets};
pub use error::{Result, ThreadkeepError};
pub use fetch::{FetchConfig, HttpSession, parse_http_url};
pub use layout::OutputLayout;
pub use links::LinkContext;
pub use localize::{LocalizeOptions, LocalizeReport, LocalizedPage, PageLocalizer};
pub use parse::{Document, Element};
pub use profile::SiteProfile;
pub use rewrite::{RewriteOutcome, RewritePlan, rewrite_page};
pub use thread::{ThreadInfo, sanitize_folder_name, thread_title, total_pages};
