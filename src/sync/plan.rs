//! Structural diff between a source and a target snapshot
//!
//! Pure set arithmetic: no filesystem access. The reconciler executes the
//! plan's lists in field order, then verifies file content separately.

use crate::tree::path::is_strictly_under;
use crate::tree::walker::{PathSet, Snapshot};
use std::path::PathBuf;

/// Structural changes needed to make the target's path sets equal the source's
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Target files occupying a path the source has as a directory
    pub displaced_files: Vec<PathBuf>,
    /// Missing directories, parents before children
    pub create_dirs: Vec<PathBuf>,
    /// Top-most redundant directories; nested redundant directories go with them
    pub remove_dirs: Vec<PathBuf>,
    /// Redundant files not already removed by a directory subtree delete
    pub remove_files: Vec<PathBuf>,
    /// Files present in the source but not in the target
    pub copy_files: Vec<PathBuf>,
}

impl SyncPlan {
    /// Compute the plan from the two snapshots
    pub fn compute(source: &Snapshot, target: &Snapshot) -> Self {
        let displaced_files: Vec<PathBuf> = target
            .files
            .intersection(&source.dirs)
            .cloned()
            .collect();

        // BTreeSet order puts a parent before any of its descendants
        let create_dirs: Vec<PathBuf> = source.dirs.difference(&target.dirs).cloned().collect();

        let redundant_dirs: PathSet = target.dirs.difference(&source.dirs).cloned().collect();
        let mut remove_dirs: Vec<PathBuf> = Vec::new();
        for dir in &redundant_dirs {
            if !remove_dirs.iter().any(|top| is_strictly_under(dir, top)) {
                remove_dirs.push(dir.clone());
            }
        }

        let remove_files: Vec<PathBuf> = target
            .files
            .difference(&source.files)
            .filter(|file| !source.dirs.contains(*file))
            .filter(|file| !remove_dirs.iter().any(|dir| is_strictly_under(file, dir)))
            .cloned()
            .collect();

        let copy_files: Vec<PathBuf> = source.files.difference(&target.files).cloned().collect();

        Self {
            displaced_files,
            create_dirs,
            remove_dirs,
            remove_files,
            copy_files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.displaced_files.is_empty()
            && self.create_dirs.is_empty()
            && self.remove_dirs.is_empty()
            && self.remove_files.is_empty()
            && self.copy_files.is_empty()
    }
}
