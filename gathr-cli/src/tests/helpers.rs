//! Test helpers for writing snapshot fixtures.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::feed::FeedArgs;

/// Snapshot with one Sports fan in hub 7 and three activities.
pub(super) const SNAPSHOT: &str = r#"{
  "users": [
    { "id": 42, "home_hub_id": 7, "interests": ["SPORTS"] }
  ],
  "activities": [
    {
      "id": 1, "hub_id": 7, "title": "Five-a-side", "category": "SPORTS",
      "start_time": "2024-01-01T18:00:00", "max_members": 10, "confirmed_count": 2
    },
    {
      "id": 2, "hub_id": 7, "title": "Sketch club", "category": "ARTS",
      "start_time": "2024-01-01T19:00:00"
    },
    {
      "id": 3, "hub_id": 7, "title": "Brunch", "category": "FOOD",
      "start_time": "2024-01-02T11:00:00"
    }
  ],
  "trust_scores": { "42": 150 }
}"#;

/// Temporary directory holding fixture files.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

/// Arguments ranking the fixture user's feed on 2024-01-01 at 09:00.
pub(super) fn feed_args(snapshot: Utf8PathBuf) -> FeedArgs {
    FeedArgs {
        snapshot_path: Some(snapshot),
        user_id: Some(42),
        date: "2024-01-01".parse().ok(),
        now: "2024-01-01T09:00:00".parse().ok(),
        ..FeedArgs::default()
    }
}
