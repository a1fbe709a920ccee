//! The snapshot store: directory tree, manifest, and capture entry points.

use crate::config::{BaselineMode, StoreConfig};
use crate::manifest::{ManifestStore, Snapshot};
use crate::recorder::{CaptureMeta, FrameRecorder};
use crate::result::RevelarResult;
use crate::store::{ContentStore, MediaKind};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name under the store root.
pub const MANIFEST_FILE: &str = "snapshots.json";

/// Baseline subtree under the store root.
pub const GOLDEN_DIR: &str = "golden";

/// Content-addressed store for one test run's visual output.
///
/// Owns the directory tree and the manifest:
///
/// ```text
/// <root>/
///   images/<hex-hash>.png
///   videos/<hex-hash>.gif
///   snapshots.json
///   golden/images/...        (inline baseline sync only)
///   golden/videos/...
/// ```
///
/// Captures are made through per-capture recorders from
/// [`new_recorder`](Self::new_recorder); independent captures may record
/// and finalize concurrently within one process. Only one `SnapshotStore`
/// may own a given root per run.
#[derive(Debug)]
pub struct SnapshotStore {
    root: PathBuf,
    config: StoreConfig,
    content: ContentStore,
    manifest: ManifestStore,
}

impl SnapshotStore {
    /// Open a store at `root`, creating directories and an empty manifest
    /// as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory tree or the initial manifest
    /// cannot be created.
    pub fn open(root: impl Into<PathBuf>, config: StoreConfig) -> RevelarResult<Self> {
        let root = root.into();
        let content = ContentStore::open(&root)?;
        if config.baseline == BaselineMode::Inline {
            let golden = root.join(GOLDEN_DIR);
            fs::create_dir_all(golden.join(MediaKind::Image.subdir()))?;
            fs::create_dir_all(golden.join(MediaKind::Video.subdir()))?;
        }
        let manifest = ManifestStore::new(root.join(MANIFEST_FILE));
        manifest.ensure_initialized()?;
        Ok(Self {
            root,
            config,
            content,
            manifest,
        })
    }

    /// The store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Begin a new capture.
    #[must_use]
    pub fn new_recorder(&self, meta: CaptureMeta) -> FrameRecorder<'_> {
        FrameRecorder::new(self, meta)
    }

    /// Ordered records of every capture finalized so far this run.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.manifest.snapshots()
    }

    /// Flush the manifest to disk. Call once when the run ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the atomic manifest write fails.
    pub fn close(&self) -> RevelarResult<()> {
        self.manifest.flush()
    }

    pub(crate) fn content(&self) -> &ContentStore {
        &self.content
    }

    pub(crate) fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::BaselineMode;

    #[test]
    fn test_open_initializes_tree_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path(), StoreConfig::default()).unwrap();

        assert!(store.root().join("images").is_dir());
        assert!(store.root().join("videos").is_dir());
        assert_eq!(
            fs::read_to_string(store.root().join(MANIFEST_FILE)).unwrap(),
            "[]"
        );
        assert!(!store.root().join(GOLDEN_DIR).exists());
    }

    #[test]
    fn test_inline_baseline_creates_golden_tree() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new().with_baseline(BaselineMode::Inline);
        let store = SnapshotStore::open(dir.path(), config).unwrap();

        assert!(store.root().join("golden/images").is_dir());
        assert!(store.root().join("golden/videos").is_dir());
    }

    #[test]
    fn test_reopen_preserves_existing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SnapshotStore::open(dir.path(), StoreConfig::default()).unwrap();
            store
                .content()
                .put(crate::store::MediaKind::Image, "abc", b"pixels")
                .unwrap();
        }
        let store = SnapshotStore::open(dir.path(), StoreConfig::default()).unwrap();
        assert!(store.content().contains(crate::store::MediaKind::Image, "abc"));
    }
}
