//! Baseline promotion: human-named copies of accepted artifacts.
//!
//! The baseline tree is the inverse of the content store: organized by
//! test identity instead of content hash, rewritten on every promotion
//! instead of deduplicated. Promoting a capture is how an accepted new
//! rendering becomes the expected result for future comparisons.

use crate::manifest::{Snapshot, TestIdentity};
use crate::result::{RevelarError, RevelarResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator used in baseline file names and substituted for denylisted
/// label characters.
pub const DELIMITER: char = '_';

/// Characters replaced by the delimiter during label sanitization.
const DENYLIST: &[char] = &[
    ' ', '`', '!', '#', '$', '%', '&', '*', '+', '=', '|', '\\', '\'', '"', '<', '>', '?', '/',
];

/// Lowercase a label and replace denylisted characters with the delimiter.
///
/// Everything outside the denylist passes through unchanged, so labels
/// keep punctuation like `~@^()[]{}:;,.` intact.
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if DENYLIST.contains(&c) { DELIMITER } else { c })
        .collect()
}

/// Flat baseline file name for a capture:
/// `<package>_<class>_<method>[_<sanitized-label>].<ext>`.
///
/// Identity segments are used verbatim; only the label is sanitized.
#[must_use]
pub fn baseline_file_name(identity: &TestIdentity, label: Option<&str>, extension: &str) -> String {
    let mut name = format!(
        "{}{DELIMITER}{}{DELIMITER}{}",
        identity.package(),
        identity.class(),
        identity.method()
    );
    if let Some(label) = label {
        name.push(DELIMITER);
        name.push_str(&sanitize_label(label));
    }
    name.push('.');
    name.push_str(extension);
    name
}

/// Copy a finalized artifact to its baseline path.
///
/// The target directory under `baseline_root` mirrors the artifact's
/// store subdirectory (`images/` or `videos/`); the target file name comes
/// from the capture's identity and label. Any existing baseline at that
/// path is overwritten unconditionally — last writer wins.
///
/// # Errors
///
/// Returns an error if the record's `file` is not a store-relative
/// artifact path, or if the copy fails.
pub fn promote(
    snapshot: &Snapshot,
    store_root: &Path,
    baseline_root: &Path,
) -> RevelarResult<PathBuf> {
    let relative = snapshot.file.as_str();
    let (subdir, file_name) = relative.split_once('/').ok_or_else(|| RevelarError::Format {
        message: format!("artifact path {relative:?} is not store-relative"),
    })?;
    let extension = Path::new(file_name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| RevelarError::Format {
            message: format!("artifact path {relative:?} has no extension"),
        })?;

    let mut source = store_root.to_path_buf();
    for part in relative.split('/') {
        source.push(part);
    }

    let target_dir = baseline_root.join(subdir);
    fs::create_dir_all(&target_dir)?;
    let target = target_dir.join(baseline_file_name(
        &snapshot.test_name,
        snapshot.name.as_deref(),
        extension,
    ));

    fs::copy(&source, &target)?;
    debug!(source = %source.display(), target = %target.display(), "promoted baseline");
    Ok(target)
}
