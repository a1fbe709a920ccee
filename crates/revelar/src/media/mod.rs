//! Media encoding for stored artifacts.
//!
//! Still images are encoded as PNG; multi-frame captures stream through an
//! incremental GIF container. Encoders never touch final store paths —
//! callers stage output and promote it through the content store.

mod animation;
mod png_writer;

pub use animation::AnimationEncoder;
pub use png_writer::encode_png;
