//! # Domain Types
//!
//! Core domain types used throughout StyleVault.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐    add_item()     ┌─────────────────┐              │
//! │  │    Product      │ ────────────────► │    LineItem     │              │
//! │  │  ─────────────  │                   │  ─────────────  │              │
//! │  │  id             │                   │  id (identity)  │              │
//! │  │  name           │                   │  price          │              │
//! │  │  price          │                   │  sale_price?    │              │
//! │  │  sale_price?    │                   │  quantity >= 1  │              │
//! │  │  size? color?   │                   │  size? color?   │              │
//! │  └─────────────────┘                   └─────────────────┘              │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │    TaxRate      │   700 bps = 7% sales tax                           │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 700 bps = 7%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product as returned by the catalog provider.
///
/// The core only relies on `id`, `name`, `price`, `sale_price` and `image`;
/// the remaining fields feed catalog filtering and search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    /// Average review rating, 0.0 - 5.0.
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    /// Size selected on the product page, if any.
    #[serde(default)]
    pub size: Option<String>,
    /// Color selected on the product page, if any.
    #[serde(default)]
    pub color: Option<String>,
}

impl Product {
    /// Creates a product with only the fields the cart needs.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            sale_price: None,
            image: String::new(),
            category: None,
            subcategory: None,
            description: None,
            tags: Vec::new(),
            featured: false,
            rating: None,
            created_at: None,
            size: None,
            color: None,
        }
    }

    /// Sets the sale price.
    pub fn with_sale_price(mut self, sale_price: Money) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    /// Records the size/color selected by the shopper.
    pub fn with_variant(mut self, size: Option<&str>, color: Option<&str>) -> Self {
        self.size = size.map(str::to_string);
        self.color = color.map(str::to_string);
        self
    }

    /// Unit price the shopper actually pays: sale price if present, else list price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// ## Invariants
/// - `id` is the identity key; the cart never holds two lines with one id
/// - `quantity >= 1` at all times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub quantity: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: String,
    pub subcategory: Option<String>,
}

impl LineItem {
    /// Creates a line with quantity 1 from a product.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            sale_price: product.sale_price,
            quantity: 1,
            size: product.size.clone(),
            color: product.color.clone(),
            image: product.image.clone(),
            subcategory: product.subcategory.clone(),
        }
    }

    /// Sale price if present, otherwise list price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }

    /// Effective price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.effective_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(700);
        assert_eq!(rate.bps(), 700);
        assert!((rate.percentage() - 7.0).abs() < 0.001);
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let product = Product::new("p-1", "Wrap Dress", Money::from_cents(8999));
        assert_eq!(product.effective_price().cents(), 8999);

        let on_sale = product.with_sale_price(Money::from_cents(5999));
        assert_eq!(on_sale.effective_price().cents(), 5999);
    }

    #[test]
    fn test_zero_sale_price_is_still_a_sale_price() {
        let free = Product::new("p-1", "Tote", Money::from_cents(2500))
            .with_sale_price(Money::zero());
        assert_eq!(free.effective_price(), Money::zero());
    }

    #[test]
    fn test_line_item_from_product_copies_variant() {
        let product = Product::new("p-2", "Silk Scarf", Money::from_cents(4999))
            .with_variant(Some("M"), Some("Navy"));
        let line = LineItem::from_product(&product);

        assert_eq!(line.quantity, 1);
        assert_eq!(line.size.as_deref(), Some("M"));
        assert_eq!(line.color.as_deref(), Some("Navy"));
        assert_eq!(line.line_total().cents(), 4999);
    }

    #[test]
    fn test_product_deserializes_from_camel_case() {
        let json = r#"{"id":"101","name":"White Sneakers","price":6999,"salePrice":5999}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.sale_price, Some(Money::from_cents(5999)));
        assert!(product.tags.is_empty());
    }
}
