//! The ASCII property-list dialect used by pbxproj documents.
//!
//! This is deliberately not a general-purpose plist library: it covers
//! exactly the shapes the project format uses (strings, arrays, dicts),
//! the `// !$*UTF8*$!` header, both comment styles, and the ASCII-safe
//! escaping where every character above 0x7F is written as a decimal
//! numeric character reference (`&#N;`).
//!
//! The writer is canonical — sorted keys, tab indentation — so writing the
//! same value twice produces byte-identical text.

pub mod error;
pub mod reader;
pub mod value;
pub mod writer;

pub use error::{PlistError, PlistResult};
pub use reader::{contains_merge_conflicts, parse_document};
pub use value::{Dictionary, Value};
pub use writer::write_document;
