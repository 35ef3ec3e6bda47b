//! # Checkout
//!
//! The checkout form and the three-step checkout machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Step Machine                                │
//! │                                                                         │
//! │   ┌──────────┐  next() ok  ┌──────────┐  next() ok  ┌──────────┐        │
//! │   │ Shipping │ ──────────► │ Payment  │ ──────────► │  Review  │        │
//! │   │   (1)    │ ◄────────── │   (2)    │ ◄────────── │   (3)    │        │
//! │   └──────────┘   back()    └──────────┘   back()    └────┬─────┘        │
//! │        ▲                                                 │              │
//! │        │                                  begin_submit() │              │
//! │        │                                                 ▼              │
//! │        │                                          ┌────────────┐        │
//! │        │                                          │ Processing │        │
//! │        │                                          └─────┬──────┘        │
//! │        │                                     complete() │              │
//! │        │                                                ▼              │
//! │        │            reset()                       ┌────────────┐        │
//! │        └───────────────────────────────────────── │  Complete  │        │
//! │                                                   └────────────┘        │
//! │                                                                         │
//! │  next() with invalid fields: stays put, errors populated               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine is synchronous. The delays between Processing, Complete and
//! the reset are driven by `vault-session`'s `CheckoutSession`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::order::OrderConfirmation;
use crate::validation::{validate_fields, validate_step, PAYMENT_FIELDS};

// =============================================================================
// Form Fields
// =============================================================================

/// Every field on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Address,
    City,
    PostalCode,
    Country,
    CardName,
    CardNumber,
    ExpDate,
    Cvv,
}

impl FormField {
    /// All fields in form order.
    pub const ALL: [FormField; 11] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Address,
        FormField::City,
        FormField::PostalCode,
        FormField::Country,
        FormField::CardName,
        FormField::CardNumber,
        FormField::ExpDate,
        FormField::Cvv,
    ];

    /// Wire key, as used by the storefront form (`"postalCode"`).
    pub const fn key(&self) -> &'static str {
        match self {
            FormField::FirstName => "firstName",
            FormField::LastName => "lastName",
            FormField::Email => "email",
            FormField::Address => "address",
            FormField::City => "city",
            FormField::PostalCode => "postalCode",
            FormField::Country => "country",
            FormField::CardName => "cardName",
            FormField::CardNumber => "cardNumber",
            FormField::ExpDate => "expDate",
            FormField::Cvv => "cvv",
        }
    }

    /// Human label used in validation messages.
    pub const fn label(&self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::Email => "Email",
            FormField::Address => "Address",
            FormField::City => "City",
            FormField::PostalCode => "Postal code",
            FormField::Country => "Country",
            FormField::CardName => "Name on card",
            FormField::CardNumber => "Card number",
            FormField::ExpDate => "Expiration date",
            FormField::Cvv => "CVV",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Parses a wire key (`postalCode`) or its snake_case spelling (`postal_code`).
impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_').collect();
        FormField::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown form field: {}", s))
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Validation messages keyed by field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    pub fn insert(&mut self, field: FormField, message: String) {
        self.0.insert(field, message);
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

// =============================================================================
// Checkout Form
// =============================================================================

/// Shipping and payment details entered by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub card_name: String,
    pub card_number: String,
    pub exp_date: String,
    pub cvv: String,
}

impl CheckoutForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Address => &self.address,
            FormField::City => &self.city,
            FormField::PostalCode => &self.postal_code,
            FormField::Country => &self.country,
            FormField::CardName => &self.card_name,
            FormField::CardNumber => &self.card_number,
            FormField::ExpDate => &self.exp_date,
            FormField::Cvv => &self.cvv,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Address => &mut self.address,
            FormField::City => &mut self.city,
            FormField::PostalCode => &mut self.postal_code,
            FormField::Country => &mut self.country,
            FormField::CardName => &mut self.card_name,
            FormField::CardNumber => &mut self.card_number,
            FormField::ExpDate => &mut self.exp_date,
            FormField::Cvv => &mut self.cvv,
        };
        *slot = value.into();
    }
}

// =============================================================================
// Checkout Step
// =============================================================================

/// One stage of the linear checkout flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// 1-based position shown in the progress bar.
    pub const fn number(&self) -> u8 {
        match self {
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Review => 3,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
        }
    }

    pub const fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    pub const fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Shipping => None,
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
        }
    }

    pub const ALL: [CheckoutStep; 3] = [
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress bar state of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

/// One entry of the checkout progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StepIndicator {
    pub step: CheckoutStep,
    pub number: u8,
    pub label: String,
    pub status: StepStatus,
}

// =============================================================================
// Checkout State
// =============================================================================

/// Observable checkout state.
///
/// ## Invariants
/// - `is_processing` and `is_order_complete` are never both true
/// - `confirmation` is `Some` exactly while `is_order_complete`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub is_processing: bool,
    pub is_order_complete: bool,
    pub errors: FieldErrors,
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutState {
    /// True while an order is processing or its confirmation is showing.
    pub fn is_busy(&self) -> bool {
        self.is_processing || self.is_order_complete
    }
}

// =============================================================================
// Checkout Machine
// =============================================================================

/// Drives the form through Shipping → Payment → Review → order.
///
/// ## Example
/// ```rust
/// use vault_core::{CheckoutMachine, CheckoutStep, CoreError, FormField};
///
/// let mut checkout = CheckoutMachine::new();
/// let err = checkout.next().unwrap_err();
/// assert!(matches!(err, CoreError::Validation(_)));
/// assert_eq!(checkout.state().step, CheckoutStep::Shipping);
///
/// checkout.set_field(FormField::FirstName, "Ada").unwrap();
/// assert!(checkout.state().errors.get(FormField::FirstName).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CheckoutMachine {
    form: CheckoutForm,
    state: CheckoutState,
}

impl CheckoutMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn step(&self) -> CheckoutStep {
        self.state.step
    }

    /// Updates one form field and clears that field's error.
    ///
    /// Rejected while an order is processing or complete.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> CoreResult<()> {
        if self.state.is_busy() {
            return Err(CoreError::OrderInProgress);
        }

        self.form.set(field, value);
        self.state.errors.remove(field);
        Ok(())
    }

    /// Validates the current step and advances on success.
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] with every failing field; the same map is
    ///   stored in the state and the step does not change
    /// - [`CoreError::InvalidTransition`] on Review or while busy
    pub fn next(&mut self) -> CoreResult<CheckoutStep> {
        let current = self.state.step;
        let target = match current.next() {
            Some(step) if !self.state.is_busy() => step,
            _ => {
                return Err(CoreError::InvalidTransition {
                    action: "advance",
                    step: current,
                })
            }
        };

        let errors = validate_step(current, &self.form);
        if !errors.is_empty() {
            self.state.errors = errors.clone();
            return Err(CoreError::Validation(errors));
        }

        self.state.errors.clear();
        self.state.step = target;
        Ok(target)
    }

    /// Goes back one step without validation. Stays on Shipping.
    pub fn back(&mut self) -> CoreResult<CheckoutStep> {
        if self.state.is_busy() {
            return Err(CoreError::InvalidTransition {
                action: "go back",
                step: self.state.step,
            });
        }

        if let Some(previous) = self.state.step.previous() {
            self.state.step = previous;
        }
        self.state.errors.clear();
        Ok(self.state.step)
    }

    /// Returns to Shipping, keeping what was typed.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.state.is_busy() {
            return Err(CoreError::InvalidTransition {
                action: "cancel",
                step: self.state.step,
            });
        }

        self.state.step = CheckoutStep::Shipping;
        self.state.errors.clear();
        Ok(())
    }

    /// Starts order submission from Review.
    ///
    /// The payment fields are validated again; on success the machine enters
    /// the processing sub-state.
    pub fn begin_submit(&mut self) -> CoreResult<()> {
        if self.state.is_busy() {
            return Err(CoreError::OrderInProgress);
        }
        if self.state.step != CheckoutStep::Review {
            return Err(CoreError::InvalidTransition {
                action: "submit",
                step: self.state.step,
            });
        }

        let errors = validate_fields(&PAYMENT_FIELDS, &self.form);
        if !errors.is_empty() {
            self.state.errors = errors.clone();
            return Err(CoreError::Validation(errors));
        }

        self.state.errors.clear();
        self.state.is_processing = true;
        Ok(())
    }

    /// Finishes processing and shows the confirmation.
    pub fn complete(&mut self, confirmation: OrderConfirmation) -> CoreResult<()> {
        if !self.state.is_processing {
            return Err(CoreError::InvalidTransition {
                action: "complete an order",
                step: self.state.step,
            });
        }

        self.state.is_processing = false;
        self.state.is_order_complete = true;
        self.state.confirmation = Some(confirmation);
        Ok(())
    }

    /// Empties the form and returns to the initial state.
    pub fn reset(&mut self) {
        self.form = CheckoutForm::default();
        self.state = CheckoutState::default();
    }

    /// Progress bar entries for the current step.
    pub fn step_indicators(&self) -> Vec<StepIndicator> {
        let current = self.state.step;
        CheckoutStep::ALL
            .into_iter()
            .map(|step| StepIndicator {
                step,
                number: step.number(),
                label: step.label().to_string(),
                status: if step < current {
                    StepStatus::Completed
                } else if step == current {
                    StepStatus::Current
                } else {
                    StepStatus::Upcoming
                },
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
