//! Error types for the quotebin application.
//!
//! This module defines the error categories that can surface while talking to
//! the remote bin, touching local persistence, or changing settings.

use std::io;

use thiserror::Error;

/// The main error type for the quotebin application.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network-level failure while talking to the remote store.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A required remote setting (access key, bin id) is not configured.
    #[error("Remote store is not configured: missing {setting}")]
    ConfigurationMissing { setting: String },

    /// The remote store answered with a non-success status.
    #[error("Remote store returned {status}: {message}")]
    RemoteFailure { status: u16, message: String },

    /// The remote store answered successfully but the body was unusable.
    #[error("Malformed response from remote store: {message}")]
    MalformedResponse { message: String },

    /// Saving the collection failed; carries the message shown to the user.
    #[error("{message}")]
    SaveFailed { message: String },

    /// Quote was not found when performing an operation.
    #[error("Quote not found: {id}")]
    QuoteNotFound { id: String },

    /// A new quote was missing required content.
    #[error("Invalid quote: {message}")]
    InvalidQuote { message: String },

    /// A settings value was rejected.
    #[error("Invalid setting: {message}")]
    InvalidSetting { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
