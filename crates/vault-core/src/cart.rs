//! # Cart
//!
//! The line-item collection behind the shopping cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Operation               Collection Change     │
//! │  ──────────────           ─────────               ─────────────────     │
//! │                                                                         │
//! │  "Add to cart" ─────────► add_item() ───────────► push or quantity += 1│
//! │                                                                         │
//! │  +/- buttons ───────────► update_quantity() ────► quantity = n (1..=99)│
//! │                                                                         │
//! │  Trash icon ────────────► remove_item() ────────► retain(id != x)      │
//! │                                                                         │
//! │  Order completed ───────► clear() ──────────────► items.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This type is pure; notifications, subscriptions and remote mirroring live
//! in `vault-session`'s `CartStore`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{LineItem, Product};
use crate::MAX_QUANTITY;

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same product increments quantity)
/// - Every quantity is within `1..=MAX_QUANTITY`
/// - Insertion order is preserved for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart or increments its quantity by one.
    ///
    /// Lines are matched by product `id` only; a second add with a different
    /// size or color merges into the existing line. A line already at
    /// [`MAX_QUANTITY`] stays there.
    ///
    /// ## Returns
    /// The line's quantity after the add.
    pub fn add_item(&mut self, product: &Product) -> i64 {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            if item.quantity < MAX_QUANTITY {
                item.quantity += 1;
            }
            return item.quantity;
        }

        self.items.push(LineItem::from_product(product));
        1
    }

    /// Replaces the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity < 1` or `quantity > MAX_QUANTITY`: ignored, the line keeps
    ///   its quantity
    /// - unknown id: ignored
    ///
    /// ## Returns
    /// `true` if a line was changed.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return false;
        }

        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes the line with the given id.
    pub fn remove_item(&mut self, id: &str) -> Option<LineItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by product id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines (the header badge count).
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Product {}", id), Money::from_cents(cents))
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let mut cart = Cart::new();
        let p = product("1", 999);

        assert_eq!(cart.add_item(&p), 1);
        assert_eq!(cart.add_item(&p), 2);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.get("1").map(|i| i.quantity), Some(2));
    }

    #[test]
    fn test_add_merges_regardless_of_variant() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 999).with_variant(Some("S"), None));
        cart.add_item(&product("1", 999).with_variant(Some("L"), None));

        assert_eq!(cart.item_count(), 1);
        let line = cart.get("1").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.size.as_deref(), Some("S"));
    }

    #[test]
    fn test_update_quantity_below_one_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 999));
        cart.update_quantity("1", 3);

        assert!(!cart.update_quantity("1", 0));
        assert!(!cart.update_quantity("1", -4));
        assert_eq!(cart.get("1").map(|i| i.quantity), Some(3));
    }

    #[test]
    fn test_huge_quantity_is_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 6999));

        assert!(!cart.update_quantity("1", 9_000_000_000_000_000));
        assert!(!cart.update_quantity("1", MAX_QUANTITY + 1));
        assert_eq!(cart.get("1").map(|i| i.quantity), Some(1));

        assert!(cart.update_quantity("1", MAX_QUANTITY));
        assert_eq!(cart.add_item(&product("1", 6999)), MAX_QUANTITY);

        let totals = crate::pricing::calculate_totals(cart.items());
        assert_eq!(totals.subtotal.cents(), 6999 * MAX_QUANTITY);
        assert_eq!(totals.total_quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 999));

        assert!(!cart.update_quantity("missing", 5));
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_remove_item_leaves_others_untouched() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 100));
        cart.add_item(&product("2", 200));
        cart.add_item(&product("3", 300));
        cart.update_quantity("3", 4);

        let removed = cart.remove_item("2").unwrap();
        assert_eq!(removed.id, "2");

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(cart.get("3").map(|i| i.quantity), Some(4));
        assert!(cart.remove_item("2").is_none());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 999));
        cart.add_item(&product("1", 999));
        assert_eq!(cart.total_quantity(), 2);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }
}
