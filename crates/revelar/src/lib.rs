//! Revelar: Content-Addressed Artifact Store for Visual Test Output
//!
//! Revelar (Spanish: "to develop film") persists the rendered output of
//! visual tests. Frames pushed during a capture are deduplicated by a hash
//! of their decoded pixels, grouped into a still image or an animation,
//! written atomically, and recorded in an ordered `snapshots.json`
//! manifest. An optional baseline step copies accepted artifacts into a
//! human-named golden tree.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     REVELAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌──────────────┐    ┌───────────────┐        │
//! │   │ Test Run   │───►│ FrameRecorder│───►│ ContentStore  │        │
//! │   │ (frames)   │    │ (per capture)│    │ images/videos │        │
//! │   └────────────┘    └──────┬───────┘    └───────┬───────┘        │
//! │                            │                    │                │
//! │                            ▼                    ▼                │
//! │                     ┌──────────────┐    ┌───────────────┐        │
//! │                     │ ManifestStore│    │ golden/ tree  │        │
//! │                     │snapshots.json│    │ (baselines)   │        │
//! │                     └──────────────┘    └───────────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use revelar::{CaptureMeta, Frame, SnapshotStore, StoreConfig, TestIdentity};
//!
//! # fn main() -> revelar::RevelarResult<()> {
//! let store = SnapshotStore::open("build/snapshots", StoreConfig::default())?;
//!
//! let meta = CaptureMeta::new(TestIdentity::new("app.demo", "WidgetTest", "renders"))
//!     .with_name("loading");
//! let mut recorder = store.new_recorder(meta);
//! recorder.push(&Frame::from_rgba(vec![0, 0, 0, 0], 1, 1)?)?;
//! recorder.finalize()?;
//!
//! store.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Baseline promotion into the human-named golden tree.
pub mod baseline;
mod config;
mod frame;
/// Content hashing for frames and ordered frame sequences.
pub mod hash;
/// Capture records and the ordered manifest.
pub mod manifest;
/// Media encoding for stored artifacts.
pub mod media;
mod recorder;
mod result;
mod store;
mod writer;

pub use config::{BaselineMode, MediaMode, StoreConfig};
pub use frame::Frame;
pub use manifest::{ManifestStore, Snapshot, TestIdentity};
pub use recorder::{CaptureMeta, FrameRecorder, RecorderState};
pub use result::{RevelarError, RevelarResult};
pub use store::{ContentStore, MediaKind};
pub use writer::{SnapshotStore, GOLDEN_DIR, MANIFEST_FILE};
