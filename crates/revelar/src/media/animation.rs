//! Incremental animation encoding.
//!
//! Frames stream straight through to the container file as they arrive, so
//! memory use is constant in frame count. The container is initialized
//! lazily from the first frame's dimensions and finalized by
//! [`AnimationEncoder::close`]; until the caller promotes the file it stays
//! at the temporary path it was opened with.

use crate::frame::Frame;
use crate::result::{RevelarError, RevelarResult};
use gif::Repeat;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Palette quantization speed (1 = best quality, 30 = fastest).
const ENCODE_SPEED: i32 = 10;

/// Streaming GIF encoder bound to one output path.
pub struct AnimationEncoder {
    path: PathBuf,
    frame_rate: u16,
    encoder: Option<gif::Encoder<BufWriter<File>>>,
    width: u16,
    height: u16,
    frames_written: usize,
}

impl AnimationEncoder {
    /// Bind an encoder to `path` at the given frame rate.
    ///
    /// No file is created until the first frame is encoded.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, frame_rate: u16) -> Self {
        Self {
            path: path.into(),
            frame_rate,
            encoder: None,
            width: 0,
            height: 0,
            frames_written: 0,
        }
    }

    /// The output path this encoder writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames_written
    }

    /// Frame delay in centiseconds, as the container counts time.
    #[must_use]
    pub fn frame_delay_cs(&self) -> u16 {
        (100 / self.frame_rate.max(1)).max(1)
    }

    /// Write one frame through to the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame does not fit the container (dimension
    /// change mid-stream, or a side exceeding the format's 16-bit limit) or
    /// if the underlying write fails.
    pub fn encode(&mut self, frame: &Frame) -> RevelarResult<()> {
        if frame.width() > u32::from(u16::MAX) || frame.height() > u32::from(u16::MAX) {
            return Err(RevelarError::Animation {
                message: format!(
                    "{}x{} frame exceeds the GIF dimension limit",
                    frame.width(),
                    frame.height()
                ),
            });
        }
        let width = frame.width() as u16;
        let height = frame.height() as u16;

        if self.encoder.is_none() {
            let file = File::create(&self.path)?;
            let mut encoder = gif::Encoder::new(BufWriter::new(file), width, height, &[])
                .map_err(|e| RevelarError::Animation {
                    message: format!("failed to create GIF encoder: {e}"),
                })?;
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| RevelarError::Animation {
                    message: format!("failed to set GIF repeat: {e}"),
                })?;
            self.width = width;
            self.height = height;
            self.encoder = Some(encoder);
        } else if width != self.width || height != self.height {
            return Err(RevelarError::Animation {
                message: format!(
                    "frame size changed mid-animation: {}x{} after {}x{}",
                    width, height, self.width, self.height
                ),
            });
        }

        let delay = self.frame_delay_cs();
        if let Some(encoder) = self.encoder.as_mut() {
            let mut rgba = frame.rgba().to_vec();
            let mut gif_frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, ENCODE_SPEED);
            gif_frame.delay = delay;
            encoder
                .write_frame(&gif_frame)
                .map_err(|e| RevelarError::Animation {
                    message: format!("failed to write GIF frame: {e}"),
                })?;
            self.frames_written += 1;
        }
        Ok(())
    }

    /// Finalize the container.
    ///
    /// After `close` returns, the file at the bound path is independently
    /// readable. If no frame was ever encoded, no file exists and this is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing container metadata fails.
    pub fn close(mut self) -> RevelarResult<()> {
        if let Some(encoder) = self.encoder.take() {
            // Dropping the encoder writes the container trailer and
            // flushes the buffered writer.
            drop(encoder);
            if let Ok(file) = File::open(&self.path) {
                let _ = file.sync_all();
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AnimationEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationEncoder")
            .field("path", &self.path)
            .field("frame_rate", &self.frame_rate)
            .field("frames_written", &self.frames_written)
            .finish_non_exhaustive()
    }
}
