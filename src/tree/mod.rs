//! Filesystem Trees
//!
//! Scanning a root into a snapshot of relative paths, and hashing file
//! content for equality checks between the two trees.

pub mod hasher;
pub mod path;
pub mod walker;

pub use walker::{Snapshot, Walker};
