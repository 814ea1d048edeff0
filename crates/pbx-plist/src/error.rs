use thiserror::Error;

/// Errors produced while reading plist text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlistError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unexpected end of document")]
    UnexpectedEof,
}

impl PlistError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for plist results.
pub type PlistResult<T> = Result<T, PlistError>;
