//! # Validation Module
//!
//! Checkout form validation for StyleVault.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Per-Step Field Rules                               │
//! │                                                                         │
//! │  Step 1: Shipping                                                      │
//! │  ├── firstName, lastName, address, city, postalCode, country           │
//! │  │     required (non-blank after trim)                                 │
//! │  └── email  required, then local@domain.tld shape                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Step 2: Payment                                                       │
//! │  ├── cardName    required                                              │
//! │  ├── cardNumber  required, 16 digits once whitespace is stripped       │
//! │  ├── expDate     required, MM/YY with month 01-12                      │
//! │  └── cvv         required, 3 or 4 digits                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Step 3: Review  (no fields)                                           │
//! │                                                                         │
//! │  Every failing field gets one message; an empty map means valid.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vault_core::validation::{validate_card_number, validate_expiry};
//!
//! assert!(validate_card_number("4242 4242 4242 4242").is_ok());
//! assert!(validate_expiry("13/25").is_err());
//! ```

use crate::checkout::{CheckoutForm, CheckoutStep, FieldErrors, FormField};
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fields checked on the Shipping step, in display order.
pub const SHIPPING_FIELDS: [FormField; 7] = [
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Address,
    FormField::City,
    FormField::PostalCode,
    FormField::Country,
];

/// Fields checked on the Payment step, in display order.
pub const PAYMENT_FIELDS: [FormField; 4] = [
    FormField::CardName,
    FormField::CardNumber,
    FormField::ExpDate,
    FormField::Cvv,
];

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a field is not blank.
pub fn validate_required(label: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(label));
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Some whitespace-free run must look like `local@domain.tld`: a non-empty
///   local part, then a domain holding a `.` with characters on both sides
///
/// ## Example
/// ```rust
/// use vault_core::validation::validate_email;
///
/// assert!(validate_email("ada@stylevault.com").is_ok());
/// assert!(validate_email("ada@stylevault").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("Email", email)?;

    if !email.split_whitespace().any(is_email_shaped) {
        return Err(ValidationError::invalid("Email", "is invalid"));
    }

    Ok(())
}

fn is_email_shaped(token: &str) -> bool {
    token.match_indices('@').any(|(at, _)| {
        let domain = &token[at + 1..];
        at > 0
            && domain
                .char_indices()
                .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

/// Validates a card number.
///
/// Whitespace anywhere in the input is ignored, so `"4242 4242 4242 4242"`
/// passes.
pub fn validate_card_number(number: &str) -> ValidationResult<()> {
    validate_required("Card number", number)?;

    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid("Card number", "must be 16 digits"));
    }

    Ok(())
}

/// Validates a card expiry date in `MM/YY` form.
///
/// ## Rules
/// - Exactly five characters, no surrounding whitespace
/// - Month `01` through `12`
/// - The year is any two digits; expired cards are not detected
pub fn validate_expiry(expiry: &str) -> ValidationResult<()> {
    validate_required("Expiration date", expiry)?;

    let invalid = || ValidationError::pattern("Expiration date", "MM/YY");

    let (month, year) = expiry.split_once('/').ok_or_else(invalid)?;
    if month.len() != 2
        || year.len() != 2
        || !month.chars().chain(year.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    match month.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a card security code (3 or 4 digits).
pub fn validate_cvv(cvv: &str) -> ValidationResult<()> {
    validate_required("CVV", cvv)?;

    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid("CVV", "must be 3 or 4 digits"));
    }

    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a single form field by its rule.
pub fn validate_field(field: FormField, value: &str) -> ValidationResult<()> {
    match field {
        FormField::Email => validate_email(value),
        FormField::CardNumber => validate_card_number(value),
        FormField::ExpDate => validate_expiry(value),
        FormField::Cvv => validate_cvv(value),
        other => validate_required(other.label(), value),
    }
}

/// Validates the fields belonging to `step`.
///
/// ## Returns
/// A map of failing fields to their messages. Empty means the step is valid.
///
/// ## Example
/// ```rust
/// use vault_core::{CheckoutForm, CheckoutStep, FormField};
/// use vault_core::validation::validate_step;
///
/// let mut form = CheckoutForm::default();
/// form.set(FormField::CardNumber, "1234 5678 9012 345");
///
/// let errors = validate_step(CheckoutStep::Payment, &form);
/// assert_eq!(errors.get(FormField::CardNumber), Some("Card number must be 16 digits"));
/// assert_eq!(errors.get(FormField::Cvv), Some("CVV is required"));
/// ```
pub fn validate_step(step: CheckoutStep, form: &CheckoutForm) -> FieldErrors {
    validate_fields(fields_for_step(step), form)
}

/// Fields checked when leaving `step`.
pub fn fields_for_step(step: CheckoutStep) -> &'static [FormField] {
    match step {
        CheckoutStep::Shipping => &SHIPPING_FIELDS,
        CheckoutStep::Payment => &PAYMENT_FIELDS,
        CheckoutStep::Review => &[],
    }
}

/// Validates a set of fields against the form.
pub fn validate_fields(fields: &[FormField], form: &CheckoutForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for &field in fields {
        if let Err(e) = validate_field(field, form.get(field)) {
            errors.insert(field, e.to_string());
        }
    }
    errors
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_form() -> CheckoutForm {
        let mut form = CheckoutForm::default();
        form.set(FormField::FirstName, "Ada");
        form.set(FormField::LastName, "Lovelace");
        form.set(FormField::Email, "ada@stylevault.com");
        form.set(FormField::Address, "12 Analytical Way");
        form.set(FormField::City, "London");
        form.set(FormField::PostalCode, "N1 9GU");
        form.set(FormField::Country, "UK");
        form
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("City", "Paris").is_ok());
        assert_eq!(
            validate_required("City", "   ").unwrap_err().to_string(),
            "City is required"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@mail.example.org").is_ok());
        // A well-formed run anywhere in the input is accepted.
        assert!(validate_email("contact: ada@b.co").is_ok());

        assert_eq!(
            validate_email("").unwrap_err().to_string(),
            "Email is required"
        );
        for bad in ["ada", "@b.co", "ada@.co", "ada@b.", "ada@b", "ada @b.co"] {
            assert_eq!(
                validate_email(bad).unwrap_err().to_string(),
                "Email is invalid",
                "{bad}"
            );
        }
    }

    #[test]
    fn test_validate_card_number() {
        assert!(validate_card_number("4242424242424242").is_ok());
        assert!(validate_card_number("4242 4242 4242 4242").is_ok());

        assert_eq!(
            validate_card_number("1234 5678 9012 345").unwrap_err().to_string(),
            "Card number must be 16 digits"
        );
        assert!(validate_card_number("4242-4242-4242-4242").is_err());
        assert!(validate_card_number("42424242424242424").is_err());
        assert_eq!(
            validate_card_number(" ").unwrap_err().to_string(),
            "Card number is required"
        );
    }

    #[test]
    fn test_validate_expiry() {
        assert!(validate_expiry("01/27").is_ok());
        assert!(validate_expiry("12/30").is_ok());

        for bad in ["00/27", "13/27", "1/27", "01/2027", "0127", "ab/cd", "01/27 "] {
            assert_eq!(
                validate_expiry(bad).unwrap_err().to_string(),
                "Format must be MM/YY",
                "{bad}"
            );
        }
        assert!(matches!(
            validate_expiry(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cvv() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12345").is_err());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn test_shipping_step_reports_every_failure() {
        let errors = validate_step(CheckoutStep::Shipping, &CheckoutForm::default());
        assert_eq!(errors.len(), 7);
        assert_eq!(errors.get(FormField::FirstName), Some("First name is required"));
        assert_eq!(errors.get(FormField::PostalCode), Some("Postal code is required"));
        assert_eq!(errors.get(FormField::CardNumber), None);
    }

    #[test]
    fn test_shipping_step_valid() {
        assert!(validate_step(CheckoutStep::Shipping, &shipping_form()).is_empty());
    }

    #[test]
    fn test_payment_step_ignores_shipping_fields() {
        let mut form = CheckoutForm::default();
        form.set(FormField::CardName, "Ada Lovelace");
        form.set(FormField::CardNumber, "4242 4242 4242 4242");
        form.set(FormField::ExpDate, "08/29");
        form.set(FormField::Cvv, "321");

        assert!(validate_step(CheckoutStep::Payment, &form).is_empty());
    }

    #[test]
    fn test_review_step_has_no_fields() {
        assert!(validate_step(CheckoutStep::Review, &CheckoutForm::default()).is_empty());
    }
}
