use std::io;

use thiserror::Error;

/// Custom result type for Skylift operations
pub type SkyliftResult<T> = Result<T, SkyliftError>;

/// Custom error type for Skylift operations
#[derive(Debug, Error)]
pub enum SkyliftError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SkyliftError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Config(msg.into())
    }

    /// Create a new network (transport-level) error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Network(msg.into())
    }

    /// Create a new API (application-level) error
    pub fn api<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Api(msg.into())
    }

    /// Create a new authorization error
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Unauthorized(msg.into())
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Serialization(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Timeout(msg.into())
    }

    /// Create a new git error
    pub fn git<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Git(msg.into())
    }

    /// Create a new other error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SkyliftError::Other(msg.into())
    }

    /// Whether this error indicates a rejected or missing credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SkyliftError::Unauthorized(_))
    }
}

impl From<io::Error> for SkyliftError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SkyliftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SkyliftError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for SkyliftError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SkyliftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
