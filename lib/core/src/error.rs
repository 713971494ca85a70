use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("{kind} not found: {value}")]
    NotFound { kind: &'static str, value: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid artifact: {0}")]
    Artifact(String),

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Error::Artifact(msg.into())
    }

    /// True for the three caller-input failures (unknown key, bad argument,
    /// out-of-domain record). Everything else is a server-side fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::PropertyNotFound(_)
                | Error::LocationNotFound(_)
                | Error::NotFound { .. }
                | Error::InvalidArgument(_)
                | Error::Validation { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PropertyNotFound(_) | Error::LocationNotFound(_) | Error::NotFound { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
