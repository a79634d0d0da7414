//! Error types for Clarity client operations

use crate::codec::CodecError;

/// Result type for Clarity client operations
pub type Result<T> = std::result::Result<T, ClarityError>;

/// Error types for the Clarity client and the layers composed around it
#[derive(Debug, thiserror::Error)]
pub enum ClarityError {
    /// The server reported that the entity does not exist
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Playback has no captured exchange for the call
    #[error("No recording {file}: {reason}")]
    NoRecording {
        /// Name of the file that would hold the recording
        file: String,
        /// What was being looked up
        reason: String,
    },

    /// A locator could not be parsed or has no usable path
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A call was made with arguments the client cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The server answered with an error status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The request never produced a server answer
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ClarityError {
    /// True for failures a caller should treat as "the entity is not there".
    ///
    /// A missing playback recording answers the same way a live 404 does.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClarityError::NotFound(_) | ClarityError::NoRecording { .. } => true,
            ClarityError::Server { status, .. } => *status == 404,
            _ => false,
        }
    }
}

impl From<String> for ClarityError {
    fn from(s: String) -> Self {
        ClarityError::Other(s)
    }
}

impl From<&str> for ClarityError {
    fn from(s: &str) -> Self {
        ClarityError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for ClarityError {
    fn from(err: anyhow::Error) -> Self {
        ClarityError::Other(err.to_string())
    }
}
