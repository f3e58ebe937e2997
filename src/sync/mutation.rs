//! Mutations applied to the target tree and the per-pass report

use crate::error::SyncError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single filesystem change applied to the target tree
///
/// Paths are relative to the roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateDir(PathBuf),
    DeleteDirSubtree(PathBuf),
    DeleteFile(PathBuf),
    CopyFile(PathBuf),
    OverwriteFile(PathBuf),
}

impl Mutation {
    pub fn path(&self) -> &Path {
        match self {
            Mutation::CreateDir(p)
            | Mutation::DeleteDirSubtree(p)
            | Mutation::DeleteFile(p)
            | Mutation::CopyFile(p)
            | Mutation::OverwriteFile(p) => p,
        }
    }

    /// Whether this mutation writes file content into the target
    pub fn is_file_write(&self) -> bool {
        matches!(self, Mutation::CopyFile(_) | Mutation::OverwriteFile(_))
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, path) = match self {
            Mutation::CreateDir(p) => ("create-dir", p),
            Mutation::DeleteDirSubtree(p) => ("delete-dir", p),
            Mutation::DeleteFile(p) => ("delete-file", p),
            Mutation::CopyFile(p) => ("copy-file", p),
            Mutation::OverwriteFile(p) => ("overwrite-file", p),
        };
        write!(f, "{} {}", kind, path.display())
    }
}

/// Failure of a single path, isolated from the rest of the pass
#[derive(Debug)]
pub struct PathFailure {
    pub path: PathBuf,
    pub error: SyncError,
}

/// Outcome of one reconciliation pass
#[derive(Debug)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    /// Mutations actually applied, in order
    pub mutations: Vec<Mutation>,
    /// Source files whose target copy already matched and was left untouched
    pub unchanged: usize,
    pub failures: Vec<PathFailure>,
}

impl PassReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            mutations: Vec::new(),
            unchanged: 0,
            failures: Vec::new(),
        }
    }

    /// True when the pass found the target already in agreement
    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty() && self.failures.is_empty()
    }

    pub fn count(&self, pred: impl Fn(&Mutation) -> bool) -> usize {
        self.mutations.iter().filter(|m| pred(m)).count()
    }

    /// Mutations touching the given relative path
    pub fn mutations_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Mutation> + 'a {
        self.mutations.iter().filter(move |m| m.path() == path)
    }

    pub(crate) fn record(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub(crate) fn fail(&mut self, path: impl Into<PathBuf>, error: SyncError) {
        self.failures.push(PathFailure {
            path: path.into(),
            error,
        });
    }

    pub(crate) fn has_failed(&self, path: &Path) -> bool {
        self.failures.iter().any(|f| f.path == path)
    }
}

impl Default for PassReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dir(s) created, {} dir(s) removed, {} file(s) removed, {} file(s) copied, {} file(s) overwritten, {} unchanged, {} failure(s)",
            self.count(|m| matches!(m, Mutation::CreateDir(_))),
            self.count(|m| matches!(m, Mutation::DeleteDirSubtree(_))),
            self.count(|m| matches!(m, Mutation::DeleteFile(_))),
            self.count(|m| matches!(m, Mutation::CopyFile(_))),
            self.count(|m| matches!(m, Mutation::OverwriteFile(_))),
            self.unchanged,
            self.failures.len(),
        )
    }
}
