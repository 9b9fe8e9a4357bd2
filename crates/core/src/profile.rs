//! Site profiles: the markers and selectors that describe one forum template.
//!
//! The defaults match the forum template the archiver was written for. A
//! profile can be loaded from a JSON file to adapt the same pipeline to a
//! template that names things differently; missing keys keep their defaults.
//!
//! ```json
//! {
//!     "pagination_selector": "nav.pages a",
//!     "placeholder_markers": ["blank.gif", "spacer.png"]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, ThreadkeepError};

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "threadkeep";
const PROFILE_FILE_NAME: &str = "profile.json";

/// Markers and selectors describing a forum template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Selector for the anchors of the bottom pagination panel.
    pub pagination_selector: String,
    /// Meta key holding the thread title.
    pub title_meta: String,
    /// Lazy-load attribute consulted before `src` on images.
    pub lazy_attribute: String,
    /// Substrings that mark an image URL as a tracking pixel or spacer.
    pub placeholder_markers: Vec<String>,
    /// Path fragment identifying avatar images.
    pub avatar_marker: String,
    /// Path fragment identifying user profile links.
    pub profile_marker: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            pagination_selector: "div#bottompanel a".to_string(),
            title_meta: "og:title".to_string(),
            lazy_attribute: "data-src".to_string(),
            placeholder_markers: vec!["pix.gif".to_string()],
            avatar_marker: "/img/users/avatar/".to_string(),
            profile_marker: "/id/".to_string(),
        }
    }
}

impl SiteProfile {
    /// Parses a profile from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ThreadkeepError::ConfigError(format!("Invalid site profile: {}", e)))
    }

    /// Loads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ThreadkeepError::ConfigError(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Where a user-wide profile is looked up when none is given explicitly.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(PROFILE_FILE_NAME))
    }

    /// Loads `path` if given, else the user-wide profile if it exists, else
    /// the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading user site profile");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Whether an image URL is a known placeholder.
    pub fn is_placeholder(&self, url: &str) -> bool {
        self.placeholder_markers
            .iter()
            .any(|marker| !marker.is_empty() && url.contains(marker.as_str()))
    }

    /// Whether a URL points at an avatar image.
    pub fn is_avatar(&self, url: &str) -> bool {
        !self.avatar_marker.is_empty() && url.contains(&self.avatar_marker)
    }

    /// Whether an href must never be rewritten (profile pages and avatars).
    pub fn is_protected_link(&self, href: &str) -> bool {
        (!self.profile_marker.is_empty() && href.contains(&self.profile_marker)) || self.is_avatar(href)
    }
}
