//! Core error types for keepsake-core.
//!
//! The celebration core has no error type of its own: misuse there is a
//! no-op. Everything that touches the gateway, the config file or user
//! input reports through the hierarchy below.

use std::path::PathBuf;
use thiserror::Error;

use crate::gateway::Entity;

/// Core error type for keepsake-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote table/storage errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the Remote Data Gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No record with this id
    #[error("{entity} record '{id}' not found")]
    NotFound { entity: Entity, id: String },

    /// The service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never got an answer
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The answer could not be read as the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Gateway URL or key missing
    #[error("gateway not configured: {0}")]
    NotConfigured(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Could not resolve the configuration directory
    #[error("Could not create data directory: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Validation errors for user-entered records.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Required text is empty or whitespace
    #[error("'{field}' must not be blank")]
    Blank { field: &'static str },

    /// Number outside its allowed range
    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
