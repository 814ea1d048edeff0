//! Per-kind attribute schemas for pbxkit project objects.
//!
//! The object graph and the serializer are agnostic to how many object kinds
//! exist: everything kind-specific — default attribute values, which
//! attributes hold references, the designated sort key, whether a kind is an
//! exclusively-owned link object — is looked up through a [`SchemaTable`]
//! injected at construction time.
//!
//! [`builtin::standard`] ships the catalog for the object kinds found in
//! Xcode project documents, populated once from static data.

pub mod builtin;
pub mod schema;

pub use schema::{AttrClass, ObjectSchema, SchemaTable};
