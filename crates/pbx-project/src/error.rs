use std::path::PathBuf;

use thiserror::Error;

use pbx_graph::{GraphError, LoadError};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// Path-based lookups need an absolute path to resolve against.
    #[error("path must be absolute, got `{0}`")]
    RelativePath(PathBuf),

    /// Host-target queries only apply to app-extension targets.
    #[error("target `{0}` is not an app extension")]
    NotAnAppExtension(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type ProjectResult<T> = Result<T, ProjectError>;
