//! Global error types for the client core.
//!
//! Everything below the session boundary (transport failures, storage
//! failures, rejected requests) is translated into this taxonomy before it
//! reaches a screen. Permission denial is deliberately absent: the evaluator
//! answers `false`, it never fails.

use thiserror::Error;

/// Errors surfaced by the session, API, and storage layers.
#[derive(Debug, Error)]
pub enum Error {
    /// An explicit login attempt failed: rejected credentials, an unknown
    /// tenant, or an unreachable auth endpoint. Callers show one generic
    /// message and use the detail for logging only.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A previously accepted bearer was rejected on a later call. Handled by
    /// a silent transition back to anonymous, never a blocking dialog.
    #[error("Session expired")]
    SessionExpired,

    /// The durable credential store could not be read or written.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The API rejected a request for a non-authentication reason.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP call itself could not complete.
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// A request payload failed local validation before any network call.
    #[error("Validation error: {message}")]
    Validation { message: String },
}

pub type ClientResult<T> = Result<T, Error>;

impl Error {
    // Helper constructors for common patterns

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
