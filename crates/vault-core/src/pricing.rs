//! # Pricing
//!
//! Derives cart totals from line items using the store's fixed rules.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Totals Derivation                                    │
//! │                                                                         │
//! │  subtotal = Σ (sale_price ?? price) × quantity                          │
//! │                                                                         │
//! │  shipping = $0.00   if subtotal >  $100.00                              │
//! │           = $12.99  otherwise (exactly $100.00 still pays)              │
//! │                                                                         │
//! │  tax      = subtotal × 7%   (rounded once, from the exact subtotal)     │
//! │                                                                         │
//! │  total    = subtotal + shipping + tax                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never stored. Every snapshot calls [`calculate_totals`] on the
//! current items, so they cannot drift from the cart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::estimate_delivery;
use crate::types::LineItem;
use crate::{FLAT_SHIPPING, FREE_SHIPPING_THRESHOLD, SALES_TAX_RATE};

/// Derived cart totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Distinct lines.
    pub item_count: usize,
    /// Sum of quantities (header badge).
    pub total_quantity: i64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartTotals {
    /// True when the order ships free.
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Computes totals for the given line items.
///
/// ## Example
/// ```rust
/// use vault_core::{calculate_totals, LineItem, Money, Product};
///
/// let mut line = LineItem::from_product(&Product::new("1", "Coat", Money::from_cents(5000)));
/// line.quantity = 2;
///
/// let totals = calculate_totals(&[line]);
/// assert_eq!(totals.subtotal.to_string(), "$100.00");
/// assert_eq!(totals.shipping.to_string(), "$12.99");
/// assert_eq!(totals.tax.to_string(), "$7.00");
/// assert_eq!(totals.total.to_string(), "$119.99");
/// ```
pub fn calculate_totals(items: &[LineItem]) -> CartTotals {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let shipping = shipping_for(subtotal);
    let tax = subtotal.calculate_tax(SALES_TAX_RATE);

    CartTotals {
        item_count: items.len(),
        total_quantity: items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity)),
        subtotal,
        shipping,
        tax,
        total: subtotal + shipping + tax,
    }
}

/// Shipping charge for a subtotal.
pub fn shipping_for(subtotal: Money) -> Money {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING
    }
}

// =============================================================================
// Order Summary (Review step)
// =============================================================================

/// One row of the review-step order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub line_total: Money,
}

/// View model for the Review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub totals: CartTotals,
    #[ts(as = "String")]
    pub estimated_delivery: NaiveDate,
}

impl OrderSummary {
    /// Builds the summary for `items`, estimating delivery `delivery_days`
    /// after `today`.
    pub fn build(items: &[LineItem], today: NaiveDate, delivery_days: i64) -> Self {
        let lines = items
            .iter()
            .map(|item| SummaryLine {
                id: item.id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect();

        OrderSummary {
            lines,
            totals: calculate_totals(items),
            estimated_delivery: estimate_delivery(today, delivery_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn line(id: &str, cents: i64, quantity: i64) -> LineItem {
        let mut item = LineItem::from_product(&Product::new(id, id, Money::from_cents(cents)));
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_empty_cart_still_charges_shipping() {
        let totals = calculate_totals(&[]);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.shipping, FLAT_SHIPPING);
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total, FLAT_SHIPPING);
    }

    #[test]
    fn test_two_fifty_dollar_items() {
        let totals = calculate_totals(&[line("a", 5000, 2)]);
        assert_eq!(totals.subtotal.cents(), 10000);
        assert_eq!(totals.shipping.cents(), 1299);
        assert_eq!(totals.tax.cents(), 700);
        assert_eq!(totals.total.cents(), 11999);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.item_count, 1);
    }

    #[test]
    fn test_free_shipping_boundary_is_exclusive() {
        assert_eq!(shipping_for(Money::from_cents(10000)).cents(), 1299);
        assert_eq!(shipping_for(Money::from_cents(10001)).cents(), 0);

        let totals = calculate_totals(&[line("a", 10001, 1)]);
        assert!(totals.is_free_shipping());
    }

    #[test]
    fn test_sale_price_drives_subtotal() {
        let mut item = line("a", 8000, 2);
        item.sale_price = Some(Money::from_cents(6000));
        let totals = calculate_totals(&[item]);
        assert_eq!(totals.subtotal.cents(), 12000);
        assert!(totals.is_free_shipping());
    }

    #[test]
    fn test_tax_rounds_once_from_subtotal() {
        // Per-line rounding would give 3 × round(3.5) = 12 cents.
        let items = vec![line("a", 50, 1), line("b", 50, 1), line("c", 50, 1)];
        let totals = calculate_totals(&items);
        assert_eq!(totals.subtotal.cents(), 150);
        assert_eq!(totals.tax.cents(), 11); // round(10.5)
    }

    #[test]
    fn test_order_summary() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 30).unwrap();
        let summary = OrderSummary::build(&[line("a", 6999, 2), line("b", 3999, 1)], today, 7);

        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total.cents(), 13998);
        assert_eq!(summary.totals.subtotal.cents(), 17997);
        assert_eq!(
            summary.estimated_delivery,
            NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()
        );
    }
}
