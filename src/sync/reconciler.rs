//! Single reconciliation pass
//!
//! Order matters: directories are created before files are copied into them,
//! redundant subtrees are removed before individual files, and content is
//! verified last against a fresh listing of the target.

use crate::error::SyncError;
use crate::sync::mutation::{Mutation, PassReport};
use crate::sync::plan::SyncPlan;
use crate::tree::hasher::{hash_file_chunked, DEFAULT_CHUNK_SIZE};
use crate::tree::walker::{PathSet, Walker};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Default number of overwrite+rehash attempts before giving up on a file
pub const DEFAULT_VERIFY_ATTEMPTS: u32 = 3;

/// Tunables for a reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Read size used when hashing files
    pub chunk_size: usize,
    /// Overwrite+rehash attempts per file before recording a mismatch
    pub verify_attempts: u32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_attempts: DEFAULT_VERIFY_ATTEMPTS,
        }
    }
}

/// Content hash routine: file path and read size in, hex digest out
pub type HashFn = Box<dyn Fn(&Path, usize) -> io::Result<String> + Send + Sync>;

/// Verification result for one source file
enum Verified {
    Unchanged,
    Written(Mutation),
}

/// Reconciles a target root against a source root
pub struct Reconciler {
    source: PathBuf,
    target: PathBuf,
    options: ReconcileOptions,
    hasher: HashFn,
}

impl Reconciler {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self::with_options(source, target, ReconcileOptions::default())
    }

    pub fn with_options(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            options,
            hasher: Box::new(hash_file_chunked),
        }
    }

    /// Replace the content hash routine used for every comparison
    pub fn with_hasher(
        mut self,
        hasher: impl Fn(&Path, usize) -> io::Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Run one complete pass
    ///
    /// Only a scan failure aborts the pass. Every other failure is isolated to
    /// its path, logged, and recorded in the returned report.
    pub fn run_pass(&self) -> Result<PassReport, SyncError> {
        let mut report = PassReport::new();

        let source_walker = Walker::new(&self.source);
        let target_walker = Walker::new(&self.target);
        let source = source_walker.scan()?;
        let target = target_walker.scan()?;
        debug!(
            source_dirs = source.dirs.len(),
            source_files = source.files.len(),
            target_dirs = target.dirs.len(),
            target_files = target.files.len(),
            "Scanned source and target"
        );

        let plan = SyncPlan::compute(&source, &target);

        for rel in &plan.displaced_files {
            info!(path = %rel.display(), "Removing file that blocks a source directory");
            self.delete_file(rel, &mut report);
        }

        for rel in &plan.create_dirs {
            info!(path = %rel.display(), "Creating missing directory");
            match fs::create_dir_all(self.target.join(rel)) {
                Ok(()) => report.record(Mutation::CreateDir(rel.clone())),
                Err(e) => {
                    let err = SyncError::io("create directory", self.target.join(rel), e);
                    self.isolate(&mut report, rel, err);
                }
            }
        }

        for rel in &plan.remove_dirs {
            let abs = self.target.join(rel);
            match fs::remove_dir_all(&abs) {
                Ok(()) => {
                    info!(path = %rel.display(), "Deleted redundant directory");
                    report.record(Mutation::DeleteDirSubtree(rel.clone()));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %rel.display(), "Redundant directory already absent");
                }
                Err(e) => self.isolate(&mut report, rel, SyncError::io("delete directory", abs, e)),
            }
        }

        for rel in &plan.remove_files {
            info!(path = %rel.display(), "Removing redundant file");
            self.delete_file(rel, &mut report);
        }

        let mut copied = PathSet::new();
        for rel in &plan.copy_files {
            info!(path = %rel.display(), "Copying missing file");
            let (src, dst) = (self.source.join(rel), self.target.join(rel));
            match fs::copy(&src, &dst) {
                Ok(_) => {
                    report.record(Mutation::CopyFile(rel.clone()));
                    copied.insert(rel.clone());
                }
                Err(e) => self.isolate(&mut report, rel, SyncError::io("copy", src, e)),
            }
        }

        // Only files can have changed since the first target scan
        let present = target_walker.scan_files()?;

        for rel in &source.files {
            if report.has_failed(rel) {
                continue;
            }
            match self.verify_file(rel, &present) {
                // A file copied above verifies equal but was not left untouched
                Ok(Verified::Unchanged) if copied.contains(rel) => {}
                Ok(Verified::Unchanged) => report.unchanged += 1,
                Ok(Verified::Written(mutation)) => report.record(mutation),
                Err(e) => self.isolate(&mut report, rel, e),
            }
        }

        Ok(report)
    }

    /// Compare a source file against its target copy, rewriting it until the hashes agree
    fn verify_file(&self, rel: &Path, present: &PathSet) -> Result<Verified, SyncError> {
        let src = self.source.join(rel);
        let dst = self.target.join(rel);

        let source_hash = self.hash(&src)?;
        let mut replaced = false;
        let target_hash = if !present.contains(rel) {
            None
        } else if unlink_non_regular(&dst).map_err(|e| SyncError::io("unlink", &dst, e))? {
            info!(path = %rel.display(), "Removed link or special file standing in for a source file");
            replaced = true;
            None
        } else {
            match (self.hasher)(&dst, self.options.chunk_size) {
                Ok(hash) => Some(hash),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(SyncError::io("hash", dst, e)),
            }
        };

        let mutation = match target_hash {
            Some(ref hash) if *hash == source_hash => {
                debug!(path = %rel.display(), hash = %source_hash, "File unchanged, skipping");
                return Ok(Verified::Unchanged);
            }
            Some(ref hash) => {
                info!(
                    path = %rel.display(),
                    source_hash = %source_hash,
                    target_hash = %hash,
                    "Overwriting file as its hash differs from the source"
                );
                Mutation::OverwriteFile(rel.to_path_buf())
            }
            None if replaced => Mutation::OverwriteFile(rel.to_path_buf()),
            None => {
                info!(path = %rel.display(), "Copying file missing from target");
                Mutation::CopyFile(rel.to_path_buf())
            }
        };

        let attempts = self.options.verify_attempts.max(1);
        let mut last = (source_hash, target_hash.unwrap_or_default());
        for attempt in 1..=attempts {
            self.overwrite(&src, &dst)?;

            let source_hash = self.hash(&src)?;
            let target_hash = self.hash(&dst)?;
            if source_hash == target_hash {
                info!(path = %rel.display(), hash = %target_hash, "File written, hash matches the source");
                return Ok(Verified::Written(mutation));
            }

            error!(
                path = %rel.display(),
                attempt,
                attempts,
                source_hash = %source_hash,
                target_hash = %target_hash,
                "Copied file hash does not match the source"
            );
            last = (source_hash, target_hash);
        }

        Err(SyncError::VerificationMismatch {
            path: rel.to_path_buf(),
            attempts,
            source_hash: last.0,
            target_hash: last.1,
        })
    }

    /// Copy content and modification time from `src` over `dst`
    ///
    /// A link at `dst` is replaced, never written through.
    fn overwrite(&self, src: &Path, dst: &Path) -> Result<(), SyncError> {
        unlink_non_regular(dst).map_err(|e| SyncError::io("unlink", dst, e))?;
        fs::copy(src, dst).map_err(|e| SyncError::io("overwrite", dst, e))?;

        let modified = fs::metadata(src).and_then(|m| m.modified());
        match modified {
            Ok(mtime) => {
                let result = fs::OpenOptions::new()
                    .write(true)
                    .open(dst)
                    .and_then(|f| f.set_modified(mtime));
                if let Err(e) = result {
                    warn!(path = %dst.display(), error = %e, "Failed to preserve modification time");
                }
            }
            Err(e) => {
                warn!(path = %src.display(), error = %e, "Failed to read source modification time");
            }
        }
        Ok(())
    }

    fn delete_file(&self, rel: &Path, report: &mut PassReport) {
        let abs = self.target.join(rel);
        match fs::remove_file(&abs) {
            Ok(()) => report.record(Mutation::DeleteFile(rel.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %rel.display(), "Redundant file already absent");
            }
            Err(e) => self.isolate(report, rel, SyncError::io("delete file", abs, e)),
        }
    }

    fn hash(&self, path: &Path) -> Result<String, SyncError> {
        (self.hasher)(path, self.options.chunk_size).map_err(|e| SyncError::io("hash", path, e))
    }

    fn isolate(&self, report: &mut PassReport, rel: &Path, err: SyncError) {
        error!(path = %rel.display(), error = %err, "Skipping path for this pass");
        report.fail(rel, err);
    }
}

/// Remove `path` if it is a symlink or special file. Returns whether it did.
fn unlink_non_regular(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_file() && !meta.is_dir() => {
            fs::remove_file(path)?;
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
