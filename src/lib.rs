//! Periodic Sync: One-Way Directory Reconciliation
//!
//! Keeps a target directory tree identical to a source tree by re-running a
//! scan, diff and apply pass on a fixed interval. Content equality is decided
//! by BLAKE3 digests, never by timestamps.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod sync;
pub mod tree;
