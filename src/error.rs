use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(signage::config),
        help("set the variable in the environment or in a .env file")
    )]
    Configuration(String),

    #[error("Upstream error: {0}")]
    #[diagnostic(code(signage::upstream))]
    Upstream(String),

    #[error("Cache error: {0}")]
    #[diagnostic(code(signage::cache))]
    Cache(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(signage::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(signage::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(signage::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(signage::other))]
    Other(String),
}

impl Error {
    /// Whether the cache may stand in for the failed operation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Upstream(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SignageResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Configuration(format!("Missing {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Configuration(message.to_string())
}

/// Helper to create upstream errors
pub fn upstream_error(message: &str) -> Error {
    Error::Upstream(message.to_string())
}

/// Helper to create cache errors
pub fn cache_error(message: &str) -> Error {
    Error::Cache(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
