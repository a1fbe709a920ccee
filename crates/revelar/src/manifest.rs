//! Capture records and the ordered manifest.
//!
//! The manifest is the run's wire contract: an ordered JSON array of
//! records, one per finalized capture, in capture order. It always exists
//! on disk once a store is initialized (possibly as an empty array), and it
//! is rewritten wholesale on flush with the same atomic temp-then-rename
//! discipline as artifact writes.

use crate::result::{RevelarError, RevelarResult};
use crate::store::write_atomically;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Fully qualified test identity: package, class, and method.
///
/// The textual form is `package.Class#method`; the method is everything
/// after the last `#`, the class is the segment after the last `.` before
/// it, and the package is everything up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    package: String,
    class: String,
    method: String,
}

impl TestIdentity {
    /// Create an identity from its three segments.
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        class: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
            method: method.into(),
        }
    }

    /// Package segment.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Class segment.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Method segment.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}#{}", self.package, self.class, self.method)
    }
}

impl FromStr for TestIdentity {
    type Err = RevelarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RevelarError::Format {
            message: format!("test name {s:?} is not of the form package.Class#method"),
        };
        let (qualified, method) = s.rsplit_once('#').ok_or_else(malformed)?;
        let (package, class) = qualified.rsplit_once('.').ok_or_else(malformed)?;
        if package.is_empty() || class.is_empty() || method.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(package, class, method))
    }
}

impl Serialize for TestIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TestIdentity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One finalized capture record.
///
/// Immutable once created; `file` is the artifact's store-relative path
/// with forward slashes and always resolves to a stored artifact at
/// manifest-write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Optional human-readable capture label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning test, serialized as `package.Class#method`.
    #[serde(rename = "testName")]
    pub test_name: TestIdentity,
    /// Capture instant, millisecond precision on the wire.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Ordered tags; omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Artifact path relative to the store root.
    pub file: String,
}

/// Wire format for [`Snapshot::timestamp`]: ISO-8601 UTC with exactly
/// millisecond precision, e.g. `2019-03-20T10:27:43.000Z`.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let naive =
            NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)?;
        Ok(naive.and_utc())
    }
}

/// Parse a manifest file into its ordered records.
///
/// # Errors
///
/// A missing file, unreadable JSON, or any record whose `testName` fails
/// the identity grammar is fatal: the whole load fails and no partial
/// result is returned.
pub fn load(path: &Path) -> RevelarResult<Vec<Snapshot>> {
    let bytes = fs::read(path)?;
    let records = serde_json::from_slice(&bytes)?;
    Ok(records)
}

/// Ordered, append-only record list, atomically serialized to disk.
///
/// Appends accumulate in memory; [`ManifestStore::flush`] rewrites the
/// manifest file wholesale. One instance per store root per run — two
/// instances sharing a root would overwrite each other's flushes.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    records: Mutex<Vec<Snapshot>>,
}

impl ManifestStore {
    /// Bind a manifest to its file path. Touches no disk state.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// The manifest file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty manifest if none exists, so readers never observe a
    /// missing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial write fails.
    pub fn ensure_initialized(&self) -> RevelarResult<()> {
        if !self.path.exists() {
            self.flush()?;
        }
        Ok(())
    }

    /// Append a record to the in-memory list. Does not write to disk.
    pub fn append(&self, snapshot: Snapshot) {
        self.lock_records().push(snapshot);
    }

    /// Ordered copy of the records appended so far.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.lock_records().clone()
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// Whether no record has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    /// Serialize the whole record list and atomically replace the manifest
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails; the
    /// previous manifest content is then still intact on disk.
    pub fn flush(&self) -> RevelarResult<()> {
        let records = self.snapshots();
        let json = serde_json::to_vec_pretty(&records)?;
        write_atomically(&self.path, &json)?;
        debug!(count = records.len(), path = %self.path.display(), "flushed manifest");
        Ok(())
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<Snapshot>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn identity() -> TestIdentity {
        TestIdentity::new("app.cash.paparazzi", "CelebrityTest", "testSettings")
    }

    fn record(name: Option<&str>, tags: &[&str], file: &str) -> Snapshot {
        Snapshot {
            name: name.map(String::from),
            test_name: identity(),
            timestamp: Utc.with_ymd_and_hms(2019, 3, 20, 10, 27, 43).unwrap(),
            tags: tags.iter().map(ToString::to_string).collect(),
            file: file.to_string(),
        }
    }

    mod test_identity_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(
                identity().to_string(),
                "app.cash.paparazzi.CelebrityTest#testSettings"
            );
        }

        #[test]
        fn test_parse_round_trip() {
            let parsed: TestIdentity = "app.cash.paparazzi.CelebrityTest#testSettings"
                .parse()
                .unwrap();
            assert_eq!(parsed, identity());
            assert_eq!(parsed.package(), "app.cash.paparazzi");
            assert_eq!(parsed.class(), "CelebrityTest");
            assert_eq!(parsed.method(), "testSettings");
        }

        #[test]
        fn test_parse_single_segment_package() {
            let parsed: TestIdentity = "pkg.Class#method".parse().unwrap();
            assert_eq!(parsed.package(), "pkg");
            assert_eq!(parsed.class(), "Class");
        }

        #[test]
        fn test_parse_rejects_malformed_input() {
            for bad in [
                "",
                "no-separators",
                "missing.method",
                "NoPackage#method",
                "pkg.Class#",
                ".Class#method",
                "pkg.#method",
            ] {
                assert!(bad.parse::<TestIdentity>().is_err(), "accepted {bad:?}");
            }
        }
    }

    mod snapshot_serde_tests {
        use super::*;

        #[test]
        fn test_serializes_all_fields() {
            let json =
                serde_json::to_value(record(Some("loading"), &["redesign"], "images/abc.png"))
                    .unwrap();
            assert_eq!(
                json,
                serde_json::json!({
                    "name": "loading",
                    "testName": "app.cash.paparazzi.CelebrityTest#testSettings",
                    "timestamp": "2019-03-20T10:27:43.000Z",
                    "tags": ["redesign"],
                    "file": "images/abc.png"
                })
            );
        }

        #[test]
        fn test_omits_absent_name_and_empty_tags() {
            let json = serde_json::to_value(record(None, &[], "images/abc.png")).unwrap();
            let object = json.as_object().unwrap();
            assert!(!object.contains_key("name"));
            assert!(!object.contains_key("tags"));
        }

        #[test]
        fn test_timestamp_millisecond_precision() {
            let mut snapshot = record(None, &[], "images/abc.png");
            snapshot.timestamp = Utc
                .with_ymd_and_hms(2019, 3, 20, 10, 27, 43)
                .unwrap()
                .checked_add_signed(chrono::Duration::milliseconds(250))
                .unwrap();
            let json = serde_json::to_value(&snapshot).unwrap();
            assert_eq!(json["timestamp"], "2019-03-20T10:27:43.250Z");
        }

        #[test]
        fn test_deserialize_defaults() {
            let snapshot: Snapshot = serde_json::from_str(
                r#"{
                    "testName": "pkg.Class#method",
                    "timestamp": "2019-03-20T10:27:43.000Z",
                    "file": "images/abc.png"
                }"#,
            )
            .unwrap();
            assert_eq!(snapshot.name, None);
            assert!(snapshot.tags.is_empty());
        }

        #[test]
        fn test_malformed_test_name_is_fatal() {
            let result: Result<Snapshot, _> = serde_json::from_str(
                r#"{
                    "testName": "not a test name",
                    "timestamp": "2019-03-20T10:27:43.000Z",
                    "file": "images/abc.png"
                }"#,
            );
            assert!(result.is_err());
        }
    }

    mod manifest_store_tests {
        use super::*;

        #[test]
        fn test_ensure_initialized_writes_empty_array() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("snapshots.json");
            let store = ManifestStore::new(&path);

            store.ensure_initialized().unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

            // A second call must not clobber existing content.
            store.append(record(Some("loading"), &[], "images/abc.png"));
            store.flush().unwrap();
            store.ensure_initialized().unwrap();
            assert_eq!(load(&path).unwrap().len(), 1);
        }

        #[test]
        fn test_append_is_memory_only() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("snapshots.json");
            let store = ManifestStore::new(&path);
            store.ensure_initialized().unwrap();

            store.append(record(None, &[], "images/abc.png"));
            assert_eq!(store.len(), 1);
            assert_eq!(load(&path).unwrap().len(), 0);

            store.flush().unwrap();
            assert_eq!(load(&path).unwrap().len(), 1);
        }

        #[test]
        fn test_round_trip_preserves_order() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("snapshots.json");
            let store = ManifestStore::new(&path);

            let records: Vec<Snapshot> = (0..5)
                .map(|i| {
                    let name = format!("shot-{i}");
                    record(Some(&name), &["tag"], &format!("images/{i}.png"))
                })
                .collect();
            for snapshot in &records {
                store.append(snapshot.clone());
            }
            store.flush().unwrap();

            assert_eq!(load(&path).unwrap(), records);
        }

        #[test]
        fn test_flush_overwrites_wholesale() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("snapshots.json");
            fs::write(&path, "[{\"stale\": true}]").unwrap();

            let store = ManifestStore::new(&path);
            store.append(record(None, &[], "images/abc.png"));
            store.flush().unwrap();

            let loaded = load(&path).unwrap();
            assert_eq!(loaded.len(), 1);
            assert_eq!(loaded[0].file, "images/abc.png");
        }

        #[test]
        fn test_load_missing_manifest_is_fatal() {
            let dir = tempfile::tempdir().unwrap();
            assert!(load(&dir.path().join("snapshots.json")).is_err());
        }

        #[test]
        fn test_load_rejects_malformed_entry_entirely() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("snapshots.json");
            fs::write(
                &path,
                r#"[
                    {"testName": "pkg.Class#good", "timestamp": "2019-03-20T10:27:43.000Z", "file": "images/a.png"},
                    {"testName": "broken", "timestamp": "2019-03-20T10:27:43.000Z", "file": "images/b.png"}
                ]"#,
            )
            .unwrap();
            assert!(load(&path).is_err());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_identity_round_trips(
                package in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
                class in "[A-Z][A-Za-z0-9]{0,12}",
                method in "[a-z][A-Za-z0-9]{0,12}"
            ) {
                let identity = TestIdentity::new(package.as_str(), class.as_str(), method.as_str());
                let parsed: TestIdentity = identity.to_string().parse().unwrap();
                prop_assert_eq!(parsed, identity);
            }
        }
    }
}
