//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Catalog prices like 69.99 are not representable in binary floats:     │
//! │    69.99 * 3 = 209.96999999999997                                       │
//! │                                                                         │
//! │  Summing a cart of such lines, then applying 7% tax, drifts by          │
//! │  fractions of a cent that show up as off-by-one totals.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    6999 cents * 3 = 20997 cents, exactly                                │
//! │    Tax is rounded once, from the exact subtotal                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vault_core::money::Money;
//!
//! let price = Money::from_cents(6999);   // $69.99
//! let line = price * 3;                   // $209.97
//! assert_eq!(line.to_string(), "$209.97");
//!
//! // Parsing catalog / shell input never goes through f64
//! let parsed: Money = "69.99".parse().unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──┬──► LineItem.effective_price ──► line total (× quantity)
///                 │
///                 └──► Displayed as "$69.99" in the UI
///
/// Σ line totals ──► subtotal ──► shipping rule, 7% tax ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vault_core::money::Money;
    ///
    /// let price = Money::from_cents(1299); // Represents $12.99
    /// assert_eq!(price.cents(), 1299);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Calculates tax, rounding half up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides the
    /// half-up rounding (5000/10000 = 0.5). Computed in i128 so large carts
    /// cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use vault_core::money::Money;
    /// use vault_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(10000); // $100.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(700)); // 7%
    /// assert_eq!(tax.cents(), 700);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use vault_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(3999); // $39.99
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 7998);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.99`.
///
/// ## Note
/// The shell swaps the `$` for the configured currency symbol via
/// [`Money::display_with`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with("$"))
    }
}

impl Money {
    /// Formats the amount with a custom currency symbol.
    pub fn display_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Multiplication by a line quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Parses a decimal amount such as `"69.99"`, `"$12"` or `"0.5"`.
///
/// ## Rules
/// - Optional leading `$`
/// - At most two fractional digits (no silent rounding)
/// - Negative amounts are rejected; catalog prices are never negative
impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must contain only digits and one decimal point"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(|| invalid("amount too large"))?
        };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))?,
        };

        Ok(Money(whole_cents + frac_cents))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1299);
        assert_eq!(money.cents(), 1299);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1299).to_string(), "$12.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_cents(11999).display_with("€"), "€119.99");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let tee = Money::from_cents(6999);
        assert_eq!(tee.multiply_quantity(9_000_000_000_000_000).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + tee).cents(), i64::MAX);
        assert!(Money::from_cents(i64::MAX).calculate_tax(TaxRate::from_bps(700)).cents() > 0);
    }

    #[test]
    fn test_tax_is_seven_percent_of_round_subtotal() {
        let tax = Money::from_cents(10000).calculate_tax(TaxRate::from_bps(700));
        assert_eq!(tax.cents(), 700);
    }

    #[test]
    fn test_tax_rounds_half_up_once() {
        // $0.50 * 7% = 3.5 cents → 4 cents
        let tax = Money::from_cents(50).calculate_tax(TaxRate::from_bps(700));
        assert_eq!(tax.cents(), 4);

        // $10.01 * 7% = 70.07 cents → 70 cents
        let tax = Money::from_cents(1001).calculate_tax(TaxRate::from_bps(700));
        assert_eq!(tax.cents(), 70);
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!("69.99".parse::<Money>().unwrap().cents(), 6999);
        assert_eq!("$12".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!(".75".parse::<Money>().unwrap().cents(), 75);
        assert_eq!(" 100.00 ".parse::<Money>().unwrap().cents(), 10000);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Money>().is_err());
        assert!("$".parse::<Money>().is_err());
        assert!("12.999".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }
}
