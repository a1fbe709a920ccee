//! Content hashing for frames and ordered frame sequences.
//!
//! Hashes are computed over decoded pixel content (one big-endian 32-bit
//! ARGB integer per pixel, row-major), so two encodings of the same pixels
//! share an identity while a single differing pixel produces a different
//! one. Digests are 160-bit, rendered as lowercase hex, and depend on
//! nothing platform- or run-specific.

use crate::frame::Frame;
use sha1::{Digest, Sha1};

/// Hash the decoded pixel content of a frame.
#[must_use]
pub fn hash_frame(frame: &Frame) -> String {
    let mut hasher = Sha1::new();
    for pixel in frame.argb_pixels() {
        hasher.update(pixel.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Hash an ordered sequence of hex digests.
///
/// Each digest's UTF-8 bytes are fed through the hash followed by a
/// newline separator, in input order, so reordering frames changes the
/// result even when the set of frames does not.
#[must_use]
pub fn hash_sequence<I, S>(hashes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha1::new();
    for hash in hashes {
        hasher.update(hash.as_ref().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
