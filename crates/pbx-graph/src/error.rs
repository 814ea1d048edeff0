use pbx_plist::PlistError;
use pbx_types::{TypeError, Uuid};
use thiserror::Error;

/// Errors produced by graph construction and mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown object {0}")]
    UnknownUuid(Uuid),

    #[error("object {0} is not registered in the project")]
    NotRegistered(Uuid),

    #[error("the root object cannot be removed")]
    CannotRemoveRoot,

    #[error("no schema for object kind {0:?}")]
    UnknownKind(String),

    #[error("attribute {attr:?} of {uuid} is not a reference list")]
    NotAReferenceList { uuid: Uuid, attr: String },
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors produced while loading a document into a graph.
///
/// A load either yields a complete graph or one of these; a partially-built
/// graph is never returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("document contains unresolved merge conflicts")]
    MergeConflict,

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Plist(#[from] PlistError),

    #[error("object {referrer} attribute {attr:?} references unknown object {target}")]
    DanglingReference {
        referrer: Uuid,
        attr: String,
        target: Uuid,
    },

    #[error("no schema for object kind {kind:?} (object {uuid})")]
    UnknownKind { uuid: Uuid, kind: String },

    #[error("invalid identifier: {0}")]
    Identifier(#[from] TypeError),
}

/// Convenience alias for load results.
pub type LoadResult<T> = Result<T, LoadError>;
