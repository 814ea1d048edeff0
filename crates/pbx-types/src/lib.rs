//! Foundation types for pbxkit.
//!
//! This crate provides the identifier and attribute-value types used
//! throughout the pbxkit workspace. Every other pbxkit crate depends on
//! `pbx-types`.
//!
//! # Key Types
//!
//! - [`Uuid`] — Object identifier inside one project document
//! - [`AttrValue`] — Attribute value of a project object (scalar, list,
//!   dict, reference, or reference list)

pub mod error;
pub mod uuid;
pub mod value;

pub use error::TypeError;
pub use uuid::Uuid;
pub use value::AttrValue;
