//! Store configuration.
//!
//! Two orthogonal axes cover the deployment variants seen in practice:
//! which media a store may produce, and when (if ever) finalized artifacts
//! are copied into the golden baseline tree.

use serde::{Deserialize, Serialize};

/// Which artifact media the store may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MediaMode {
    /// Still images only. Multi-frame captures are discarded on finalize;
    /// this is a documented limitation of image-only deployments, not an
    /// error.
    ImageOnly,
    /// Still images plus animated artifacts for multi-frame captures.
    #[default]
    ImageAndVideo,
}

/// When finalized artifacts are copied into the golden baseline tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BaselineMode {
    /// No baseline copies are made.
    #[default]
    Disabled,
    /// Every finalized artifact is promoted immediately.
    Inline,
    /// An external step promotes from the manifest after the run; the
    /// store itself makes no copies.
    External,
}

/// Configuration for a snapshot store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Media axis.
    pub media: MediaMode,
    /// Baseline sync axis.
    pub baseline: BaselineMode,
    /// Frame rate forwarded to the animation container (1-60). Does not
    /// participate in content hashing.
    pub frame_rate: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            media: MediaMode::ImageAndVideo,
            baseline: BaselineMode::Disabled,
            frame_rate: 30,
        }
    }
}

impl StoreConfig {
    /// Create a configuration with the default axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the media axis.
    #[must_use]
    pub fn with_media(mut self, media: MediaMode) -> Self {
        self.media = media;
        self
    }

    /// Set the baseline sync axis.
    #[must_use]
    pub fn with_baseline(mut self, baseline: BaselineMode) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the animation frame rate (clamped to 1-60).
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: u16) -> Self {
        self.frame_rate = frame_rate.clamp(1, 60);
        self
    }

    /// Whether multi-frame captures may produce animation artifacts.
    #[must_use]
    pub fn video_enabled(&self) -> bool {
        self.media == MediaMode::ImageAndVideo
    }
}
