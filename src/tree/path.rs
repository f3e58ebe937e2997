//! Path canonicalization and relative-path utilities

use std::path::{Path, PathBuf};

/// Canonicalize a root directory
///
/// Uses dunce so Windows paths stay free of the `\\?\` prefix.
pub fn canonicalize_root(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// True if `a` and `b` are the same path or one contains the other
///
/// Both inputs are expected to be canonical.
pub fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// True if `path` lies strictly underneath `dir` (component-wise, not by string prefix)
pub fn is_strictly_under(path: &Path, dir: &Path) -> bool {
    path != dir && path.starts_with(dir)
}
