//! # Shell Error Type
//!
//! Unified error type for shell commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  input line ──► Command::parse ──── bad syntax ──────► Usage           │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │                ShellState::execute                                     │
//! │                      │                                                  │
//! │                      ├── CoreError::Validation ──────► Validation      │
//! │                      │     (one line per field)                         │
//! │                      ├── CoreError (transition) ─────► Checkout        │
//! │                      ├── RemoteError::NotFound ──────► NotFound        │
//! │                      ├── RemoteError (other) ────────► Remote          │
//! │                      └── NotSignedIn ────────────────► Auth            │
//! │                                                                         │
//! │  Printed as:  error[VALIDATION_ERROR]: Email is invalid                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use vault_core::CoreError;
use vault_session::{RemoteError, SessionError};

/// Error returned from a shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Command line could not be parsed
    Usage,

    /// Product or record does not exist
    NotFound,

    /// Checkout form fields failed validation
    ValidationError,

    /// Checkout transition not allowed right now
    Checkout,

    /// Provider call failed
    Remote,

    /// Action needs a signed-in shopper
    Auth,

    /// Anything else
    Internal,
}

impl ErrorCode {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Usage => "USAGE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Checkout => "CHECKOUT",
            ErrorCode::Remote => "REMOTE",
            ErrorCode::Auth => "AUTH",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ShellError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ShellError {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        ShellError::new(ErrorCode::Usage, message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ShellError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }
}

impl From<CoreError> for ShellError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => {
                let message = errors
                    .iter()
                    .map(|(field, message)| format!("  {}: {}", field, message))
                    .collect::<Vec<_>>()
                    .join("\n");
                ShellError::new(
                    ErrorCode::ValidationError,
                    format!("please fix the highlighted fields\n{}", message),
                )
            }
            CoreError::ItemNotFound(id) => ShellError::not_found("Cart item", &id),
            CoreError::InvalidAmount { .. } => ShellError::usage(err.to_string()),
            CoreError::InvalidTransition { .. } | CoreError::OrderInProgress => {
                ShellError::new(ErrorCode::Checkout, err.to_string())
            }
        }
    }
}

impl From<RemoteError> for ShellError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound { .. } => ShellError::new(ErrorCode::NotFound, err.to_string()),
            RemoteError::Unavailable(_) | RemoteError::Rejected(_) => {
                tracing::warn!(error = %err, "Provider call failed");
                ShellError::new(ErrorCode::Remote, err.to_string())
            }
        }
    }
}

impl From<SessionError> for ShellError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Core(e) => e.into(),
            SessionError::Remote(e) => e.into(),
            SessionError::NotSignedIn => ShellError::new(ErrorCode::Auth, err.to_string()),
            other => {
                tracing::error!(error = %other, "Session error");
                ShellError::new(ErrorCode::Internal, other.to_string())
            }
        }
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ShellError {}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::{CheckoutStep, FieldErrors, FormField};

    #[test]
    fn test_validation_lists_every_field() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::Email, "Email is invalid".into());
        errors.insert(FormField::City, "City is required".into());

        let err = ShellError::from(CoreError::Validation(errors));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("email: Email is invalid"));
        assert!(err.message.contains("city: City is required"));
    }

    #[test]
    fn test_transition_maps_to_checkout() {
        let err = ShellError::from(SessionError::Core(CoreError::InvalidTransition {
            action: "submit",
            step: CheckoutStep::Shipping,
        }));
        assert_eq!(err.code, ErrorCode::Checkout);
        assert_eq!(err.to_string(), "error[CHECKOUT]: Cannot submit from the Shipping step");
    }

    #[test]
    fn test_sign_in_required() {
        let err = ShellError::from(SessionError::NotSignedIn);
        assert_eq!(err.code, ErrorCode::Auth);
        assert_eq!(err.message, "Please sign in first");
    }
}
