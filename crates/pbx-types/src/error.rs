use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("empty identifier")]
    EmptyUuid,

    #[error("identifier contains whitespace: {0:?}")]
    WhitespaceInUuid(String),
}
