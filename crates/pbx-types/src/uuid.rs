use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of hex characters in a freshly generated identifier.
pub const GENERATED_UUID_LEN: usize = 24;

/// Object identifier inside one project document.
///
/// Identifiers generated by this toolkit are 24-character uppercase
/// hexadecimal strings; the deterministic re-keying pass produces 32-character
/// MD5 digests. Identifiers read from an existing document are carried
/// verbatim, whatever their shape, because ids minted by other tools (and ids
/// that belong to a different project's identity space) must survive a
/// load-then-save round trip unchanged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uuid(String);

impl Uuid {
    /// Wrap an identifier string read from a document.
    ///
    /// Rejects empty strings and strings containing whitespace; everything
    /// else is passed through verbatim.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypeError::EmptyUuid);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypeError::WhitespaceInUuid(s));
        }
        Ok(Self(s))
    }

    /// Wrap an identifier known to be well-formed (e.g. a literal in tests).
    ///
    /// # Panics
    ///
    /// Panics if the string is empty or contains whitespace.
    pub fn from_static(s: &str) -> Self {
        Self::parse(s).expect("malformed literal uuid")
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is entirely uppercase hexadecimal.
    pub fn is_hex(&self) -> bool {
        self.0
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    /// Returns `true` if this looks like an identifier this toolkit minted:
    /// 24 uppercase hex characters.
    pub fn is_generated_form(&self) -> bool {
        self.0.len() == GENERATED_UUID_LEN && self.is_hex()
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self.0)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
