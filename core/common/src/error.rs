//! Common error types for snipsync.

use thiserror::Error;

/// Top-level error type for snipsync operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable configuration (credential, identifier, backend).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The HTTP transport could not be constructed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The configured remote object does not exist.
    #[error("No remote snippet found (ID: {id})")]
    NotFound { id: String },

    /// The remote object exists but does not hold the expected data.
    #[error("Mismatch: {0}")]
    Mismatch(String),

    /// A request to the remote service failed.
    #[error("Request failed: {message}")]
    Request {
        message: String,
        /// HTTP status, when the service answered at all.
        status: Option<u16>,
    },

    /// An error annotated with the operation that produced it.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

/// Coarse classification of an [`Error`], looking through context layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    NotFound,
    Mismatch,
    Request,
    Other,
}

impl Error {
    /// Wrap this error with a human-readable context string.
    ///
    /// The original error stays reachable through `source()` and
    /// [`Error::root`].
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any context layers.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Classify the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Transport(_) => ErrorKind::Transport,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Mismatch(_) => ErrorKind::Mismatch,
            Error::Request { .. } => ErrorKind::Request,
            _ => ErrorKind::Other,
        }
    }

    /// HTTP status of the innermost request error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Error::Request { status, .. } => *status,
            Error::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
