//! The pbxkit object graph.
//!
//! A project document is a flat property list describing a graph of typed
//! objects linked by opaque identifiers. This crate owns the in-memory form
//! of that graph and the invariants around it:
//!
//! - identifiers are unique within one project instance and never reissued;
//! - an object is registered **iff** it is reachable from the root;
//! - every traversal is cycle-safe;
//! - an unmodified load-then-save round trip is byte-identical.
//!
//! # Key Types
//!
//! - [`ProjectGraph`] — the graph: node map, reverse-reference index, queries
//!   and mutation
//! - [`UuidRegistry`] — per-instance identifier generation and tracking
//! - [`Node`] — one typed object with its attribute map
//!
//! Serialization lives in [`serialize`], the deterministic re-keying pass in
//! [`deterministic`].

pub mod deterministic;
pub mod error;
pub mod graph;
pub mod node;
pub mod registry;
pub mod serialize;

pub use deterministic::PREDICTABLE_ROOT_UUID;
pub use error::{GraphError, GraphResult, LoadError, LoadResult};
pub use graph::ProjectGraph;
pub use node::Node;
pub use registry::UuidRegistry;
