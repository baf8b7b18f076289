//! Temporary workspaces for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A temporary directory addressed through UTF-8 paths.
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
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// A two-place catalog document around Zurich's Bellevue.
pub(super) const SMALL_CATALOG: &str = r#"{
  "updatedAt": "2025-06-01T08:00:00Z",
  "places": [
    {"id": "bellevue-cafe", "name": "Bellevue Cafe", "category": "cafe",
     "lat": 47.3667, "lon": 8.5453, "tags": ["coffee"]},
    {"id": "quai-walk", "name": "Quai Walk", "category": "walk",
     "lat": 47.3650, "lon": 8.5460, "tags": ["lake"]}
  ]
}"#;
