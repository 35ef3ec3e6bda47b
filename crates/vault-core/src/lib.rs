//! # vault-core: Pure Cart & Checkout Logic for StyleVault
//!
//! This crate is the **heart** of the StyleVault storefront client. It
//! contains the cart, pricing and checkout rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      StyleVault Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront UI / Terminal Shell                 │   │
//! │  │    Browse ──► Cart ──► Shipping ──► Payment ──► Review          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              vault-session (timers, store, providers)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vault-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ pricing │ │ checkout │ │  order  │ │   │
//! │  │   │  Money  │ │  Cart   │ │ Totals  │ │ Machine  │ │ Confirm │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LineItem, TaxRate)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Line-item collection with merge-on-add semantics
//! - [`pricing`] - Subtotal, shipping, tax and total derivation
//! - [`validation`] - Checkout form field rules
//! - [`checkout`] - Checkout form and the Shipping → Payment → Review machine
//! - [`order`] - Synthetic order confirmations
//! - [`icon`] - Closed icon table for the UI layer
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vault_core::{calculate_totals, Cart, Money, Product};
//!
//! let mut cart = Cart::new();
//! cart.add_item(&Product::new("p-1", "Linen Shirt", Money::from_cents(5000)));
//! cart.add_item(&Product::new("p-1", "Linen Shirt", Money::from_cents(5000)));
//!
//! let totals = calculate_totals(cart.items());
//! assert_eq!(totals.subtotal, Money::from_cents(10000));
//! assert_eq!(totals.shipping, Money::from_cents(1299)); // $100.00 is not > $100.00
//! assert_eq!(totals.tax, Money::from_cents(700));
//! assert_eq!(totals.total, Money::from_cents(11999));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod icon;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use checkout::{
    CheckoutForm, CheckoutMachine, CheckoutState, CheckoutStep, FieldErrors, FormField,
    StepIndicator, StepStatus,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use icon::Icon;
pub use money::Money;
pub use order::OrderConfirmation;
pub use pricing::{calculate_totals, CartTotals, OrderSummary, SummaryLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Subtotal that must be *exceeded* for free shipping ($100.00).
///
/// ## Boundary
/// A subtotal of exactly $100.00 still pays shipping; $100.01 ships free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(10_000);

/// Flat shipping charge below the free-shipping threshold ($12.99).
pub const FLAT_SHIPPING: Money = Money::from_cents(1_299);

/// Sales tax applied to the subtotal (7%).
pub const SALES_TAX_RATE: TaxRate = TaxRate::from_bps(700);

/// Days between order placement and the estimated delivery date.
pub const DEFAULT_DELIVERY_DAYS: i64 = 7;

/// Longest delivery estimate a configuration may ask for.
pub const MAX_DELIVERY_DAYS: i64 = 365;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i64 = 99;
