//! Core error types

use thiserror::Error;

/// Core error type for EATGate
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
