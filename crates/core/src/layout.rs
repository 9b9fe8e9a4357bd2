//! On-disk layout of an archived thread.
//!
//! ```text
//! <root>/
//!   html/<page>.html
//!   css/<file>
//!   images/<file>
//!   images/avatars/<file>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::assets::{AssetKind, AssetRef};

const HTML_DIR: &str = "html";

/// Paths of one archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    split_avatars: bool,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, split_avatars: bool) -> Self {
        Self { root: root.into(), split_avatars }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join(HTML_DIR)
    }

    /// Folder for assets of `kind`.
    pub fn asset_dir(&self, kind: AssetKind) -> PathBuf {
        kind.dir().split('/').fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Creates every folder of the layout. Existing folders are kept.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(self.html_dir())?;
        fs::create_dir_all(self.asset_dir(AssetKind::Stylesheet))?;
        fs::create_dir_all(self.asset_dir(AssetKind::Image))?;
        if self.split_avatars {
            fs::create_dir_all(self.asset_dir(AssetKind::Avatar))?;
        }
        Ok(())
    }

    pub fn page_path(&self, page: u32) -> PathBuf {
        self.html_dir().join(format!("{}.html", page))
    }

    pub fn asset_path(&self, asset: &AssetRef) -> PathBuf {
        self.asset_dir(asset.kind).join(&asset.file_name)
    }

    /// Writes a page, replacing any previous copy.
    pub fn write_page(&self, page: u32, html: &str) -> Result<PathBuf> {
        let path = self.page_path(page);
        fs::write(&path, html)?;
        Ok(path)
    }
}
