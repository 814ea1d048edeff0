//! The project facade: a [`ProjectGraph`](pbx_graph::ProjectGraph) bound to
//! its on-disk location.
//!
//! This crate is the only place file I/O happens; everything below it is
//! text-in/text-out. [`Project`] adds the `.xcodeproj` bundle convention,
//! path-qualified load errors, attachment helpers, and convenience queries
//! over the common object kinds.

pub mod error;
pub mod project;
pub mod query;

pub use error::{ProjectError, ProjectResult};
pub use project::{Project, PBXPROJ_FILE};
