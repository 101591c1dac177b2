use std::{io, path::PathBuf};
use thiserror::Error;

/// The broad category of a [`WriteError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// The destination could not be created or written.
    Io,
    /// The document could not be represented in the notebook format.
    Serialization,
}

/// Everything that can go wrong while writing a notebook to disk.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("could not write notebook to \"{}\"", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not serialize notebook: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cell {index} has an invalid id {id:?} (expected 1-64 characters from [a-zA-Z0-9-_])")]
    InvalidCellId { index: usize, id: String },

    #[error("cells {first} and {second} share the id {id:?}")]
    DuplicateCellId {
        first: usize,
        second: usize,
        id: String,
    },
}

impl WriteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WriteError::Io { .. } => ErrorKind::Io,
            WriteError::Serialize(_)
            | WriteError::InvalidCellId { .. }
            | WriteError::DuplicateCellId { .. } => ErrorKind::Serialization,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WriteError::Io {
            path: path.into(),
            source,
        }
    }
}
