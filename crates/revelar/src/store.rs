//! Content-addressed artifact persistence.
//!
//! Artifacts are named by the hex digest of their decoded content and live
//! under one subdirectory per media kind. Writes are atomic: a payload is
//! staged to a colocated `.tmp` file and renamed into place, so a reader
//! never observes a partial artifact at its final path. Matching hashes are
//! assumed to mean matching bytes; a second writer of the same hash is a
//! no-op rather than a conflict.

use crate::result::RevelarResult;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact kind, selecting the store subdirectory and canonical extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A still image, one frame.
    Image,
    /// An animation spanning several frames.
    Video,
}

impl MediaKind {
    /// Store subdirectory holding artifacts of this kind.
    #[must_use]
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }

    /// Canonical file extension for artifacts of this kind.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Video => "gif",
        }
    }
}

/// Durable, deduplicating store of byte payloads keyed by content hash.
#[derive(Debug)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating its subdirectories.
    ///
    /// # Errors
    ///
    /// Returns an error if a subdirectory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> RevelarResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(MediaKind::Image.subdir()))?;
        fs::create_dir_all(root.join(MediaKind::Video.subdir()))?;
        Ok(Self { root })
    }

    /// The store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the artifact `<subdir>/<hash>.<ext>`.
    #[must_use]
    pub fn artifact_path(&self, kind: MediaKind, hash: &str) -> PathBuf {
        self.root
            .join(kind.subdir())
            .join(format!("{hash}.{}", kind.extension()))
    }

    /// Store-relative path of an artifact, forward slashes on every platform.
    ///
    /// This is the form recorded in the manifest.
    #[must_use]
    pub fn relative_path(kind: MediaKind, hash: &str) -> String {
        format!("{}/{hash}.{}", kind.subdir(), kind.extension())
    }

    /// Whether an artifact with this hash is already stored.
    #[must_use]
    pub fn contains(&self, kind: MediaKind, hash: &str) -> bool {
        self.artifact_path(kind, hash).exists()
    }

    /// Persist a payload under its content hash, deduplicating.
    ///
    /// If the artifact already exists the write is skipped entirely.
    /// Returns the store-relative path for the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or renaming the payload fails; the
    /// artifact is then treated as lost rather than partially visible.
    pub fn put(&self, kind: MediaKind, hash: &str, bytes: &[u8]) -> RevelarResult<String> {
        let target = self.artifact_path(kind, hash);
        if target.exists() {
            debug!(hash, "artifact already stored, skipping write");
        } else {
            write_atomically(&target, bytes)?;
            debug!(hash, path = %target.display(), "stored artifact");
        }
        Ok(Self::relative_path(kind, hash))
    }

    /// Promote an already-written temporary file into the store.
    ///
    /// The incremental counterpart of [`ContentStore::put`] for payloads
    /// streamed to disk (animations): the finished temp file is renamed to
    /// `<subdir>/<hash>.<ext>`. If the artifact already exists, the temp
    /// file is deleted instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename or the dedup cleanup fails.
    pub fn adopt(&self, kind: MediaKind, hash: &str, temp: &Path) -> RevelarResult<String> {
        let target = self.artifact_path(kind, hash);
        if target.exists() {
            fs::remove_file(temp)?;
            debug!(hash, "artifact already stored, discarding temp file");
        } else {
            fs::rename(temp, &target)?;
            debug!(hash, path = %target.display(), "adopted artifact");
        }
        Ok(Self::relative_path(kind, hash))
    }

    /// Resolve a manifest-relative path against the store root.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in relative.split('/') {
            path.push(part);
        }
        path
    }
}

/// Write `bytes` to `path` via a colocated temp file and an atomic rename.
///
/// Only the rename makes the file visible; a failure mid-write leaves no
/// partial file at `path`.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> RevelarResult<()> {
    let tmp = temp_sibling(path);
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(bytes)?;
        let _ = file.sync_all();
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(".tmp");
    path.with_file_name(name)
}
