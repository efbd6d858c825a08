//! Core error types for eyegym-core.
//!
//! Only programmer-misuse errors ([`SessionError`]) are meant to reach the
//! caller of a running session. Narration and storage failures are absorbed
//! at the boundary where they happen and logged instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionStatus;

/// Core error type for eyegym-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session runner misuse
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The background session service is gone
    #[error("Session service is not running")]
    ServiceClosed,
}

/// Errors surfaced by the session runner to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Empty or malformed exercise sequence passed to `start()`.
    #[error("Invalid exercise script: {reason}")]
    InvalidScript { reason: String },

    /// Control action not allowed in the current status.
    #[error("Cannot {action} a session that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },
}

/// Narration engine errors. Never fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrationError {
    /// The speech engine reported a failure
    #[error("Speech engine failed: {0}")]
    Engine(String),

    /// No speech engine is available on this platform
    #[error("Speech engine unavailable")]
    Unavailable,
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The backing store rejected a read or write
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A persisted blob could not be parsed
    #[error("Corrupt value under '{key}': {message}")]
    Corruption { key: String, message: String },
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
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
