//! One-way reconciliation of a target tree against a source tree

pub mod mutation;
pub mod plan;
pub mod reconciler;

pub use mutation::{Mutation, PassReport, PathFailure};
pub use plan::SyncPlan;
pub use reconciler::{ReconcileOptions, Reconciler, DEFAULT_VERIFY_ATTEMPTS};
