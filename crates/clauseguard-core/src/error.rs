//! Error types for the Clauseguard engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Clauseguard engine.
///
/// Every public operation returns this type instead of panicking, so the
/// UI layer decides how a failure is presented. Variants are `Clone` and
/// serializable so they can be forwarded to a frontend bridge unchanged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseError {
    /// Input rejected before any remote call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// A guard for the same entity is already held
    #[error("Operation '{operation}' rejected: another operation is in flight for {entity}")]
    ConcurrentOperation { entity: String, operation: String },

    /// The remote call could not be completed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service reported a failure
    #[error("Server error: {message}")]
    Server { message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A response arrived for a session that is no longer current
    #[error("Response for session '{session_id}' was superseded and discarded")]
    Superseded { session_id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClauseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a ConcurrentOperation error
    pub fn concurrent(entity: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::ConcurrentOperation {
            entity: entity.into(),
            operation: operation.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Superseded error
    pub fn superseded(session_id: impl Into<String>) -> Self {
        Self::Superseded {
            session_id: session_id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a ConcurrentOperation error
    pub fn is_concurrent(&self) -> bool {
        matches!(self, Self::ConcurrentOperation { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Superseded error
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }

    /// Check if the failure came from the remote analysis service.
    ///
    /// Returns true for `Transport`, `Server` and `NotFound`.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Server { .. } | Self::NotFound { .. }
        )
    }

    /// Human-readable message for display in the UI.
    ///
    /// Strips the variant prefix for remote failures so the server's own
    /// wording is what the user sees.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message } => message.clone(),
            Self::Transport(message) => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ClauseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ClauseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ClauseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ClauseError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ClauseError>`.
pub type Result<T> = std::result::Result<T, ClauseError>;
