//! # Session Error Types
//!
//! Error types for the session runtime.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │     Checkout            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unavailable    │  │  Core(CoreError)        │ │
//! │  │  ConfigLoad     │  │  NotFound       │  │    validation,          │ │
//! │  │  ConfigSave     │  │  Rejected       │  │    transitions          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │    Lifecycle    │   Disposed: the session was torn down              │
//! │  │                 │   NotSignedIn: the action needs an identity        │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote failures never roll back local cart state; they are logged and
//! surfaced as error notifications.

use thiserror::Error;
use vault_core::CoreError;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for provider calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Checkout Errors
    // =========================================================================
    /// Cart or checkout rule violation (validation, bad transition).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// A provider call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The action requires a signed-in shopper.
    #[error("Please sign in first")]
    NotSignedIn,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid session configuration.
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// The session has been torn down.
    #[error("Checkout session has been torn down")]
    Disposed,
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

impl SessionError {
    /// Returns true if this is a form validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, SessionError::Core(CoreError::Validation(_)))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Remote Error
// =============================================================================

/// Failure reported by a catalog, persistence or auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The backend could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The backend refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl RemoteError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RemoteError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true if the call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }
}
