//! Filesystem operations used by unmount and purge.

use crate::HalResult;
use std::path::Path;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

pub trait FsOps {
    /// List `path`, sorted by entry name. Links are never reported as
    /// directories.
    fn read_dir(&self, path: &Path) -> HalResult<Vec<DirEntryInfo>>;

    /// Remove a file, a link, or an empty directory.
    fn remove(&self, path: &Path) -> HalResult<()>;

    /// Remove `path` and everything below it.
    fn remove_all(&self, path: &Path) -> HalResult<()>;

    /// Target of the link at `path`.
    fn read_link(&self, path: &Path) -> HalResult<String>;
}
