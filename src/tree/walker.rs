//! Filesystem walker producing relative-path snapshots of a root

use crate::error::SyncError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Set of paths relative to a scan root
pub type PathSet = BTreeSet<PathBuf>;

/// Directories and files under one root at one instant
///
/// Paths are relative to the scanned root so snapshots of different roots
/// compare directly. The root itself is never included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub dirs: PathSet,
    pub files: PathSet,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk the root recursively and collect relative directory and file paths
    ///
    /// Symbolic links are not followed. A link or special file is recorded in
    /// the file set so a pass can remove or replace it. Any listing failure,
    /// including a missing root, is returned as [`SyncError::Scan`].
    pub fn scan(&self) -> Result<Snapshot, SyncError> {
        let mut snapshot = Snapshot::default();

        // Surface a missing or non-directory root before walking
        let root_meta = std::fs::metadata(&self.root).map_err(|e| self.scan_error(e))?;
        if !root_meta.is_dir() {
            return Err(self.scan_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "scan root is not a directory",
            )));
        }

        let walker = WalkDir::new(&self.root).follow_links(false).min_depth(1);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let io = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected")
                });
                self.scan_error(io)
            })?;

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };

            if entry.file_type().is_dir() {
                snapshot.dirs.insert(relative);
            } else {
                snapshot.files.insert(relative);
            }
        }

        Ok(snapshot)
    }

    /// Re-scan only the file set
    pub fn scan_files(&self) -> Result<PathSet, SyncError> {
        self.scan().map(|snapshot| snapshot.files)
    }

    fn scan_error(&self, source: std::io::Error) -> SyncError {
        SyncError::Scan {
            root: self.root.clone(),
            source,
        }
    }
}
