//! # Provider Boundaries
//!
//! Traits for the collaborators the session talks to but does not own.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       External Interfaces                               │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────────┐  ┌──────────────────┐  │
//! │  │ CatalogProvider  │  │ PersistenceProvider  │  │  AuthProvider    │  │
//! │  │                  │  │                      │  │                  │  │
//! │  │ fetch_products   │  │ remote cart mirror   │  │ current_identity │  │
//! │  │ search_products  │  │ wishlist             │  │ login / logout   │  │
//! │  │ get_product_by_id│  │ newsletter, profile  │  │ redirect_path    │  │
//! │  └──────────────────┘  └──────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  All are `Send + Sync` and held as `Arc<dyn _>`. The in-memory         │
//! │  backend in `memory.rs` implements all three.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vault_core::{Money, Product};

use crate::error::{RemoteError, RemoteResult};

/// Page size when the caller does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Result cap for quick search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

// =============================================================================
// Catalog
// =============================================================================

/// Product ordering for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Best rated first.
    Rating,
    /// Newest first.
    Latest,
}

impl FromStr for SortBy {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "rating" => Ok(SortBy::Rating),
            "latest" => Ok(SortBy::Latest),
            other => Err(RemoteError::Rejected(format!(
                "Unknown sort order: '{}'. Valid options: price-low, price-high, rating, latest",
                other
            ))),
        }
    }
}

/// Catalog listing filters.
///
/// The price range only applies when both bounds are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub featured: bool,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// Substring of the product name.
    pub query: Option<String>,
    pub sort_by: Option<SortBy>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ProductFilters {
    fn default() -> Self {
        ProductFilters {
            category: None,
            featured: false,
            min_price: None,
            max_price: None,
            query: None,
            sort_by: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ProductFilters {
    /// Returns true if `product` passes every filter (paging aside).
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        if self.featured && !product.featured {
            return false;
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if product.price < min || product.price > max {
                return false;
            }
        }

        if let Some(query) = &self.query {
            if !product.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

/// Returns true if `product` matches a quick-search query.
///
/// Case-insensitive substring match over name, description, category,
/// subcategory and tags. A blank query matches nothing.
pub fn search_matches(product: &Product, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let contains = |s: &str| s.to_lowercase().contains(&needle);

    contains(&product.name)
        || product.description.as_deref().is_some_and(contains)
        || product.category.as_deref().is_some_and(contains)
        || product.subcategory.as_deref().is_some_and(contains)
        || product.tags.iter().any(|tag| contains(tag))
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_products(&self, filters: &ProductFilters) -> RemoteResult<Vec<Product>>;

    async fn search_products(&self, query: &str, limit: usize) -> RemoteResult<Vec<Product>>;

    async fn get_product_by_id(&self, id: &str) -> RemoteResult<Option<Product>>;
}

// =============================================================================
// Persistence
// =============================================================================

/// A line of the shopper's remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A saved wishlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub product_id: String,
    pub added_at: DateTime<Utc>,
}

/// A newsletter subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub email: String,
    pub active: bool,
    pub subscribed_at: DateTime<Utc>,
}

/// Shopper profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dark_mode_preference: bool,
}

/// Remote storage for carts, wishlists and subscriptions.
///
/// ## Cart Semantics
/// Unlike the local cart, the remote cart keeps one line per
/// product + size + color; `add_to_cart` merges only on an exact match.
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        size: Option<&str>,
        color: Option<&str>,
    ) -> RemoteResult<RemoteCartItem>;

    /// Sets the quantity of every line of `product_id`.
    async fn update_cart_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> RemoteResult<()>;

    /// Removes every line of `product_id`.
    async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> RemoteResult<()>;

    async fn clear_cart(&self, user_id: &str) -> RemoteResult<()>;

    async fn get_user_cart(&self, user_id: &str) -> RemoteResult<Vec<RemoteCartItem>>;

    /// Adding a product that is already saved returns the existing entry.
    async fn add_to_wishlist(&self, user_id: &str, product_id: &str) -> RemoteResult<WishlistItem>;

    async fn get_wishlist(&self, user_id: &str) -> RemoteResult<Vec<WishlistItem>>;

    /// Returns `false` if the product was not saved.
    async fn remove_from_wishlist(&self, user_id: &str, product_id: &str) -> RemoteResult<bool>;

    /// Subscribing an inactive address re-activates it.
    async fn subscribe_newsletter(&self, email: &str) -> RemoteResult<NewsletterSubscription>;

    /// Returns `false` if the address was never subscribed.
    async fn unsubscribe_newsletter(&self, email: &str) -> RemoteResult<bool>;

    async fn get_user_profile(&self, user_id: &str) -> RemoteResult<UserProfile>;
}

// =============================================================================
// Authentication
// =============================================================================

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

/// Shopper sign-in state.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_identity(&self) -> Option<Identity>;

    async fn login(&self, email: &str) -> RemoteResult<Identity>;

    async fn logout(&self) -> RemoteResult<()>;

    /// Where to send the shopper after sign-in.
    fn redirect_path(&self, requested: Option<&str>) -> String {
        redirect_path(requested)
    }
}

/// Keeps a requested in-app path (starting with a single `/`), else `/`.
pub fn redirect_path(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweater() -> Product {
        let mut p = Product::new("3", "Oversized Wool Sweater", Money::from_cents(8999));
        p.description = Some("Cozy oversized sweater in luxurious merino wool".into());
        p.category = Some("Women".into());
        p.subcategory = Some("Knitwear".into());
        p.tags = vec!["Cozy".into(), "Winter".into()];
        p.featured = true;
        p
    }

    #[test]
    fn test_sort_by_parsing() {
        assert_eq!("price-low".parse::<SortBy>(), Ok(SortBy::PriceLow));
        assert_eq!("latest".parse::<SortBy>(), Ok(SortBy::Latest));
        assert!("cheapest".parse::<SortBy>().is_err());
    }

    #[test]
    fn test_filters_default_page() {
        let filters = ProductFilters::default();
        assert_eq!(filters.limit, 20);
        assert_eq!(filters.offset, 0);
        assert!(filters.matches(&sweater()));
    }

    #[test]
    fn test_filters_price_range_needs_both_bounds() {
        let mut filters = ProductFilters {
            min_price: Some(Money::from_cents(10000)),
            ..Default::default()
        };
        assert!(filters.matches(&sweater()));

        filters.max_price = Some(Money::from_cents(20000));
        assert!(!filters.matches(&sweater()));
    }

    #[test]
    fn test_filters_category_and_name() {
        let filters = ProductFilters {
            category: Some("Women".into()),
            query: Some("wool".into()),
            featured: true,
            ..Default::default()
        };
        assert!(filters.matches(&sweater()));

        let filters = ProductFilters {
            category: Some("Men".into()),
            ..Default::default()
        };
        assert!(!filters.matches(&sweater()));
    }

    #[test]
    fn test_search_matches_every_text_field() {
        let p = sweater();
        assert!(search_matches(&p, "SWEATER"));
        assert!(search_matches(&p, "merino"));
        assert!(search_matches(&p, "knit"));
        assert!(search_matches(&p, "winter"));
        assert!(search_matches(&p, "  women "));
        assert!(!search_matches(&p, "denim"));
        assert!(!search_matches(&p, "   "));
    }

    #[test]
    fn test_redirect_path() {
        assert_eq!(redirect_path(Some("/checkout")), "/checkout");
        assert_eq!(redirect_path(Some("https://evil.example")), "/");
        assert_eq!(redirect_path(Some("//evil.example")), "/");
        assert_eq!(redirect_path(None), "/");
    }
}
