//! Integration tests for single reconciliation passes against real trees

use super::test_utils::{build_tree, read_tree, Roots};
use periodic_sync::error::SyncError;
use periodic_sync::sync::{Mutation, Reconciler};
use periodic_sync::tree::hasher::hash_file;
use periodic_sync::tree::Walker;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Empty target receives every directory and file
#[test]
fn test_empty_target_receives_full_copy() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("x")), ("dir/b.txt", Some("y"))]);

    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert_eq!(fs::read_to_string(roots.target.join("a.txt")).unwrap(), "x");
    assert_eq!(fs::read_to_string(roots.target.join("dir/b.txt")).unwrap(), "y");
    assert!(roots.target.join("dir").is_dir());
    assert_eq!(
        report.mutations,
        vec![
            Mutation::CreateDir(PathBuf::from("dir")),
            Mutation::CopyFile(PathBuf::from("a.txt")),
            Mutation::CopyFile(PathBuf::from("dir/b.txt")),
        ]
    );
    assert_eq!(report.unchanged, 0);
}

/// Differing content is overwritten and redundant entries are removed
#[test]
fn test_overwrite_and_remove_redundant_entries() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("x"))]);
    build_tree(
        &roots.target,
        &[("a.txt", Some("z")), ("old.txt", Some("w")), ("old_dir", None)],
    );

    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert_eq!(read_tree(&roots.target), read_tree(&roots.source));
    assert_eq!(fs::read_to_string(roots.target.join("a.txt")).unwrap(), "x");
    assert!(!roots.target.join("old.txt").exists());
    assert!(!roots.target.join("old_dir").exists());
    assert!(report
        .mutations
        .contains(&Mutation::OverwriteFile(PathBuf::from("a.txt"))));
    assert!(report.failures.is_empty());
}

/// Identical files are hashed but never copied
#[test]
fn test_identical_file_is_not_copied() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("x"))]);
    build_tree(&roots.target, &[("a.txt", Some("x"))]);
    assert_eq!(
        hash_file(&roots.source.join("a.txt")).unwrap(),
        hash_file(&roots.target.join("a.txt")).unwrap()
    );

    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert_eq!(report.mutations_for(Path::new("a.txt")).count(), 0);
    assert_eq!(report.unchanged, 1);
    assert!(report.is_noop());
}

/// A skipped file keeps its modification time
#[test]
fn test_skip_leaves_mtime_untouched() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("same"))]);
    build_tree(&roots.target, &[("a.txt", Some("same"))]);
    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * 365);
    fs::OpenOptions::new()
        .write(true)
        .open(roots.target.join("a.txt"))
        .unwrap()
        .set_modified(old)
        .unwrap();

    Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    let mtime = fs::metadata(roots.target.join("a.txt"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(mtime, old);
}

/// Files inside a redundant directory disappear with it, exactly once
#[test]
fn test_redundant_directory_contents_removed_once() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("keep.txt", Some("k"))]);
    build_tree(
        &roots.target,
        &[
            ("keep.txt", Some("k")),
            ("gone/a.txt", Some("a")),
            ("gone/nested/b.txt", Some("b")),
            ("gone/nested/deeper", None),
        ],
    );

    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert!(!roots.target.join("gone").exists());
    assert!(report.failures.is_empty());
    assert_eq!(
        report.mutations,
        vec![Mutation::DeleteDirSubtree(PathBuf::from("gone"))]
    );
}

/// A target file where the source has a directory, and the reverse
#[test]
fn test_file_and_directory_swap_places() {
    let roots = Roots::new();
    build_tree(
        &roots.source,
        &[("was_file/inner.txt", Some("i")), ("was_dir", Some("now a file"))],
    );
    build_tree(
        &roots.target,
        &[("was_file", Some("blocking")), ("was_dir/old.txt", Some("o"))],
    );

    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(read_tree(&roots.target), read_tree(&roots.source));
}

/// Running twice with no external change produces no mutations the second time
#[test]
fn test_idempotent_second_pass() {
    let roots = Roots::new();
    build_tree(
        &roots.source,
        &[
            ("a.txt", Some("1")),
            ("d1/d2/b.txt", Some("2")),
            ("empty", None),
        ],
    );
    build_tree(
        &roots.target,
        &[("a.txt", Some("old")), ("junk/j.txt", Some("j")), ("x.txt", Some("x"))],
    );

    let reconciler = Reconciler::new(&roots.source, &roots.target);
    let first = reconciler.run_pass().unwrap();
    let second = reconciler.run_pass().unwrap();

    assert!(!first.is_noop());
    assert!(second.is_noop(), "second pass mutated: {:?}", second.mutations);
    assert_eq!(second.unchanged, 2);
}

/// The target is re-checked every pass, catching drift introduced between runs
#[test]
fn test_external_drift_between_passes_is_repaired() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("x")), ("d/b.txt", Some("y"))]);

    let reconciler = Reconciler::new(&roots.source, &roots.target);
    reconciler.run_pass().unwrap();

    fs::write(roots.target.join("a.txt"), "tampered").unwrap();
    fs::remove_dir_all(roots.target.join("d")).unwrap();
    fs::write(roots.target.join("intruder.txt"), "i").unwrap();

    let report = reconciler.run_pass().unwrap();

    assert_eq!(read_tree(&roots.target), read_tree(&roots.source));
    assert!(report
        .mutations
        .contains(&Mutation::OverwriteFile(PathBuf::from("a.txt"))));
    assert!(report
        .mutations
        .contains(&Mutation::DeleteFile(PathBuf::from("intruder.txt"))));
}

/// Scan snapshots agree after a pass
#[test]
fn test_snapshots_equal_after_pass() {
    let roots = Roots::new();
    build_tree(
        &roots.source,
        &[("a/b/c/d.txt", Some("d")), ("a/e", None), ("f.bin", Some("\u{0}\u{1}"))],
    );
    build_tree(&roots.target, &[("a/b/zz", None), ("q.txt", Some("q"))]);

    Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();

    assert_eq!(
        Walker::new(&roots.source).scan().unwrap(),
        Walker::new(&roots.target).scan().unwrap()
    );
}

/// Missing roots abandon the pass with a scan error and leave the other root alone
#[test]
fn test_missing_target_root_abandons_pass() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("x"))]);
    fs::remove_dir(&roots.target).unwrap();

    let err = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap_err();

    match err {
        SyncError::Scan { root, .. } => assert_eq!(root, roots.target),
        other => panic!("expected scan error, got {other:?}"),
    }
    assert!(!roots.target.exists());
    assert!(roots.source.join("a.txt").exists());
}

/// One unreadable source file is skipped while the rest of the pass completes
#[cfg(unix)]
#[test]
fn test_unreadable_source_file_is_isolated() {
    use super::test_utils::permissions_enforced;
    use std::os::unix::fs::PermissionsExt;

    let roots = Roots::new();
    if !permissions_enforced(roots.scratch()) {
        return;
    }
    build_tree(
        &roots.source,
        &[("a.txt", Some("a")), ("b.txt", Some("b")), ("c.txt", Some("c"))],
    );
    let locked = roots.source.join("b.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let report = Reconciler::new(&roots.source, &roots.target).run_pass();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    let report = report.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, PathBuf::from("b.txt"));
    assert!(matches!(report.failures[0].error, SyncError::Io { .. }));
    assert_eq!(fs::read_to_string(roots.target.join("a.txt")).unwrap(), "a");
    assert_eq!(fs::read_to_string(roots.target.join("c.txt")).unwrap(), "c");

    // The next pass picks the file up once it is readable again
    let report = Reconciler::new(&roots.source, &roots.target)
        .run_pass()
        .unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(fs::read_to_string(roots.target.join("b.txt")).unwrap(), "b");
}

/// Links in the target are removed or replaced, never written through
#[cfg(unix)]
#[test]
fn test_target_symlinks_are_replaced_not_followed() {
    use std::os::unix::fs::symlink;

    let roots = Roots::new();
    let outside = roots.scratch().join("outside");
    fs::create_dir(&outside).unwrap();
    let precious = outside.join("precious.txt");
    fs::write(&precious, "precious").unwrap();

    build_tree(&roots.source, &[("a.txt", Some("from source")), ("d", None)]);
    symlink(&precious, roots.target.join("a.txt")).unwrap();
    symlink(&precious, roots.target.join("stale_link")).unwrap();
    symlink(roots.scratch().join("nowhere"), roots.target.join("dangling")).unwrap();
    symlink(&outside, roots.target.join("d")).unwrap();

    let reconciler = Reconciler::new(&roots.source, &roots.target);
    let report = reconciler.run_pass().unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(fs::read_to_string(&precious).unwrap(), "precious");
    assert_eq!(fs::read_dir(&outside).unwrap().count(), 1);

    let a = fs::symlink_metadata(roots.target.join("a.txt")).unwrap();
    assert!(a.file_type().is_file());
    assert_eq!(fs::read_to_string(roots.target.join("a.txt")).unwrap(), "from source");
    assert!(fs::symlink_metadata(roots.target.join("d")).unwrap().is_dir());
    assert!(fs::symlink_metadata(roots.target.join("stale_link")).is_err());
    assert!(fs::symlink_metadata(roots.target.join("dangling")).is_err());

    assert_eq!(report.mutations_for(Path::new("a.txt")).count(), 1);
    assert!(report
        .mutations
        .contains(&Mutation::DeleteFile(PathBuf::from("stale_link"))));
    assert_eq!(read_tree(&roots.target), read_tree(&roots.source));

    let second = reconciler.run_pass().unwrap();
    assert!(second.is_noop(), "second pass mutated: {:?}", second.mutations);
}
