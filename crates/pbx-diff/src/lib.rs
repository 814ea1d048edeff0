//! Structural diffing of project trees.
//!
//! A [`ProjectGraph`](pbx_graph::ProjectGraph) is flattened into a
//! human-oriented JSON tree ([`tree_snapshot`]): the root object expanded
//! inline, every reference replaced by the referenced node, and a
//! `displayName` attached to each node. Two such trees are then compared by
//! [`diff`], which reports only where they disagree — `None` means
//! equivalent.

pub mod diff;
pub mod snapshot;

pub use diff::{diff, project_diff};
pub use snapshot::tree_snapshot;
