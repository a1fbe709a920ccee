//! Per-capture frame accumulation and finalization.
//!
//! One [`FrameRecorder`] exists per logical capture. Frames are pushed
//! while the recorder is open; finalizing decides between a still image
//! (one frame), an animation (several frames), or nothing at all (zero
//! frames), persists the artifact through the content store, and appends
//! the record to the manifest. Memory stays bounded: at most one frame is
//! retained, with the rest streamed straight into the animation container.

use crate::baseline;
use crate::config::BaselineMode;
use crate::frame::Frame;
use crate::hash::{hash_frame, hash_sequence};
use crate::manifest::{Snapshot, TestIdentity};
use crate::media::{encode_png, AnimationEncoder};
use crate::result::{RevelarError, RevelarResult};
use crate::store::MediaKind;
use crate::writer::{SnapshotStore, GOLDEN_DIR};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Caller-supplied identity of a capture.
#[derive(Debug, Clone)]
pub struct CaptureMeta {
    name: Option<String>,
    test_name: TestIdentity,
    timestamp: DateTime<Utc>,
    tags: Vec<String>,
}

impl CaptureMeta {
    /// Create capture metadata for a test, timestamped now.
    #[must_use]
    pub fn new(test_name: TestIdentity) -> Self {
        Self {
            name: None,
            test_name,
            timestamp: Utc::now(),
            tags: Vec::new(),
        }
    }

    /// Set the human-readable capture label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the capture timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the ordered tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The capture label, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The owning test identity.
    #[must_use]
    pub fn test_name(&self) -> &TestIdentity {
        &self.test_name
    }

    fn into_snapshot(self, file: String) -> Snapshot {
        Snapshot {
            name: self.name,
            test_name: self.test_name,
            timestamp: self.timestamp,
            tags: self.tags,
            file,
        }
    }
}

/// Lifecycle of a frame recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Accepting frames.
    Open,
    /// Terminal; no more frames are accepted.
    Finalized,
}

/// Accumulates the frames of one logical capture.
///
/// Used sequentially by exactly one capture: any number of
/// [`push`](Self::push) calls followed by one
/// [`finalize`](Self::finalize). Temporary encoder state is scoped to the
/// recorder — it is released on finalize and on drop, so an abandoned
/// capture leaks no temp files.
#[derive(Debug)]
pub struct FrameRecorder<'a> {
    store: &'a SnapshotStore,
    meta: CaptureMeta,
    state: RecorderState,
    hashes: Vec<String>,
    first_frame: Option<Frame>,
    encoder: Option<AnimationEncoder>,
    temp_path: Option<PathBuf>,
}

impl<'a> FrameRecorder<'a> {
    pub(crate) fn new(store: &'a SnapshotStore, meta: CaptureMeta) -> Self {
        Self {
            store,
            meta,
            state: RecorderState::Open,
            hashes: Vec::new(),
            first_frame: None,
            encoder: None,
            temp_path: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Number of frames pushed so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.hashes.len()
    }

    /// The capture's metadata.
    #[must_use]
    pub fn meta(&self) -> &CaptureMeta {
        &self.meta
    }

    /// Append one frame to the capture.
    ///
    /// The frame's content hash is recorded immediately. The first frame
    /// is retained for the still-image path; once a second frame arrives
    /// (and video output is enabled) frames stream into the animation
    /// container instead of accumulating.
    ///
    /// # Errors
    ///
    /// Returns [`RevelarError::InvalidState`] after finalize, or any
    /// encoding error from the animation container.
    pub fn push(&mut self, frame: &Frame) -> RevelarResult<()> {
        if self.state != RecorderState::Open {
            return Err(RevelarError::InvalidState {
                message: "capture already finalized".to_string(),
            });
        }

        self.hashes.push(hash_frame(frame));
        if self.hashes.len() == 1 {
            self.first_frame = Some(frame.clone());
            return Ok(());
        }

        if self.store.config().video_enabled() {
            if self.encoder.is_none() {
                self.open_encoder()?;
            }
            if let Some(encoder) = self.encoder.as_mut() {
                encoder.encode(frame)?;
            }
        }
        Ok(())
    }

    /// Finalize the capture.
    ///
    /// Idempotent: a second call is a no-op returning `Ok(None)`.
    /// Returns the manifest record when an artifact was produced; `None`
    /// for a zero-frame capture and for a multi-frame capture in an
    /// image-only configuration (both deliberate non-errors).
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or persisting the artifact fails; the
    /// capture is then lost rather than silently dropped.
    pub fn finalize(&mut self) -> RevelarResult<Option<Snapshot>> {
        if self.state == RecorderState::Finalized {
            return Ok(None);
        }
        self.state = RecorderState::Finalized;

        let result = self.finish();
        self.cleanup_temp();
        result
    }

    fn finish(&mut self) -> RevelarResult<Option<Snapshot>> {
        match self.hashes.len() {
            0 => {
                debug!(test = %self.meta.test_name(), "capture produced no frames");
                Ok(None)
            }
            1 => {
                let frame = self.first_frame.take().ok_or_else(|| {
                    RevelarError::InvalidState {
                        message: "single-frame capture lost its frame".to_string(),
                    }
                })?;
                let bytes = encode_png(&frame)?;
                let file = self
                    .store
                    .content()
                    .put(MediaKind::Image, &self.hashes[0], &bytes)?;
                self.commit(file)
            }
            count => {
                let Some(encoder) = self.encoder.take() else {
                    if self.store.config().video_enabled() {
                        return Err(RevelarError::InvalidState {
                            message: "animation encoder unavailable after an earlier push failure"
                                .to_string(),
                        });
                    }
                    warn!(
                        test = %self.meta.test_name(),
                        frames = count,
                        "discarding multi-frame capture: animation output is disabled"
                    );
                    return Ok(None);
                };
                encoder.close()?;
                let temp = self.temp_path.clone().ok_or_else(|| {
                    RevelarError::InvalidState {
                        message: "animation temp file missing".to_string(),
                    }
                })?;
                let hash = hash_sequence(&self.hashes);
                let file = self.store.content().adopt(MediaKind::Video, &hash, &temp)?;
                self.temp_path = None;
                self.commit(file)
            }
        }
    }

    fn commit(&self, file: String) -> RevelarResult<Option<Snapshot>> {
        let snapshot = self.meta.clone().into_snapshot(file);
        if self.store.config().baseline == BaselineMode::Inline {
            baseline::promote(
                &snapshot,
                self.store.root(),
                &self.store.root().join(GOLDEN_DIR),
            )?;
        }
        self.store.manifest().append(snapshot.clone());
        debug!(file = %snapshot.file, frames = self.hashes.len(), "capture finalized");
        Ok(Some(snapshot))
    }

    fn open_encoder(&mut self) -> RevelarResult<()> {
        let temp = self.temp_artifact_path();
        // Register the temp path before the first write so that cleanup
        // covers a failure partway through.
        self.temp_path = Some(temp.clone());
        let mut encoder = AnimationEncoder::open(temp, self.store.config().frame_rate);
        if let Some(first) = self.first_frame.take() {
            encoder.encode(&first)?;
        }
        self.encoder = Some(encoder);
        Ok(())
    }

    fn temp_artifact_path(&self) -> PathBuf {
        let file_name =
            baseline::baseline_file_name(self.meta.test_name(), self.meta.name(), "tmp.gif");
        self.store
            .content()
            .root()
            .join(MediaKind::Video.subdir())
            .join(file_name)
    }

    fn cleanup_temp(&mut self) {
        // Drop the encoder first so the underlying file handle is closed
        // before the temp file is removed.
        self.encoder = None;
        if let Some(temp) = self.temp_path.take() {
            if temp.exists() {
                if let Err(error) = fs::remove_file(&temp) {
                    warn!(path = %temp.display(), %error, "failed to remove temp animation file");
                }
            }
        }
    }
}

impl Drop for FrameRecorder<'_> {
    fn drop(&mut self) {
        self.cleanup_temp();
    }
}
