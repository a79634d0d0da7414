//! Error types for recording and playback storage

use clarity_core::codec::CodecError;
use clarity_core::error::ClarityError;
use std::path::PathBuf;
use thiserror::Error;

/// Recording and playback specific errors
#[derive(Debug, Error)]
pub enum RecordingError {
    /// Two recorded searches for different entity types were merged
    #[error("Can't merge searches for different entity types: this search is {this}, the search to merge in is {other}")]
    MismatchedEntityType { this: String, other: String },

    /// Two distinct searches reduce to the same storage key
    #[error("Searches {new} and {existing} reduce to the same hash ({file})")]
    SignatureCollision {
        file: String,
        new: String,
        existing: String,
    },

    /// A stored file could not be parsed
    #[error("Cannot interpret the recording in {path}: {source}")]
    CorruptRecording {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// The directory to write into does not exist
    #[error("Directory {0} does not exist")]
    StorageUnavailable(PathBuf),

    /// A search parameter cannot be part of a signature
    #[error("Invalid search term: {0}")]
    InvalidSearchTerm(String),

    /// A value could not be serialized for writing
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// IO error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entity has no identity to name a file after
    #[error(transparent)]
    Identity(#[from] ClarityError),
}

impl RecordingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecordingError::Io {
            path: path.into(),
            source,
        }
    }

    /// Report a failed write without failing the call that caused it
    pub(crate) fn log(&self, action: &str) {
        match self {
            RecordingError::StorageUnavailable(_) | RecordingError::SignatureCollision { .. } => {
                tracing::error!("Could not {}: {}", action, self);
            }
            _ => tracing::warn!("Could not {}: {}", action, self),
        }
    }
}

impl From<RecordingError> for ClarityError {
    fn from(err: RecordingError) -> Self {
        match err {
            RecordingError::InvalidSearchTerm(msg) => ClarityError::InvalidArgument(msg),
            RecordingError::Codec(e) => ClarityError::Codec(e),
            RecordingError::Io { source, .. } => ClarityError::Io(source),
            RecordingError::Identity(e) => e,
            other => ClarityError::Other(other.to_string()),
        }
    }
}
