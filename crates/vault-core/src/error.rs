//! # Error Types
//!
//! Domain-specific error types for vault-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vault-core errors (this file)                                         │
//! │  ├── CoreError        - Checkout transitions, cart lookups             │
//! │  └── ValidationError  - A single form field failing its rule           │
//! │                                                                         │
//! │  vault-session errors (separate crate)                                 │
//! │  ├── SessionError     - Wraps CoreError, config, teardown              │
//! │  └── RemoteError      - Catalog / persistence provider failures        │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → CoreError → SessionError → UI   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, step, product id)
//! 3. Validation failures are recoverable and never fatal

use thiserror::Error;

use crate::checkout::{CheckoutStep, FieldErrors};

// =============================================================================
// Core Error
// =============================================================================

/// Cart and checkout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// One or more form fields failed validation for the current step.
    ///
    /// ## User Workflow
    /// ```text
    /// Step 2 (Payment), card number "1234 5678 9012 345"
    ///      │
    ///      ▼
    /// next() → Validation({ cardNumber: "Card number must be 16 digits" })
    ///      │
    ///      ▼
    /// UI highlights the field, step stays on Payment
    /// ```
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    /// The requested transition is not available from the current step.
    #[error("Cannot {action} from the {step} step")]
    InvalidTransition {
        action: &'static str,
        step: CheckoutStep,
    },

    /// An order is already being processed or has just completed.
    #[error("An order is already in progress")]
    OrderInProgress,

    /// Line item is not in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// A monetary amount could not be parsed.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },
}

impl CoreError {
    /// Returns the field errors if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CoreError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single checkout form field failing its rule.
///
/// The `field` is the human label ("First name", "Card number") so the
/// rendered message can go straight into the error map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field is present but does not match its expected shape.
    #[error("{field} {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field must follow a fixed input mask such as `MM/YY`.
    #[error("Format must be {pattern}")]
    BadPattern { field: String, pattern: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn pattern(field: &str, pattern: &str) -> Self {
        ValidationError::BadPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::FormField;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("First name");
        assert_eq!(err.to_string(), "First name is required");

        let err = ValidationError::invalid("Card number", "must be 16 digits");
        assert_eq!(err.to_string(), "Card number must be 16 digits");

        let err = ValidationError::pattern("Expiration date", "MM/YY");
        assert_eq!(err.to_string(), "Format must be MM/YY");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::InvalidTransition {
            action: "advance",
            step: CheckoutStep::Review,
        };
        assert_eq!(err.to_string(), "Cannot advance from the Review step");
    }

    #[test]
    fn test_field_errors_accessor() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::Email, "Email is invalid".to_string());
        let err = CoreError::Validation(errors);

        assert_eq!(err.to_string(), "1 field(s) failed validation");
        assert_eq!(
            err.field_errors().and_then(|e| e.get(FormField::Email)),
            Some("Email is invalid")
        );
        assert!(CoreError::OrderInProgress.field_errors().is_none());
    }
}
