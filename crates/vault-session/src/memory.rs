//! # In-Memory Backend
//!
//! Reference implementation of every provider trait, seeded with a small
//! fixture catalog. Used by the shell and by tests.
//!
//! ## Failure Injection
//! ```text
//! backend.set_offline(true)
//!      │
//!      ▼
//! every PersistenceProvider call ──► Err(RemoteError::Unavailable)
//!
//! Catalog and auth calls keep working, so the shopper can still browse.
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tracing::debug;
use uuid::Uuid;
use vault_core::validation::validate_email;
use vault_core::{Money, Product};

use crate::error::{RemoteError, RemoteResult};
use crate::remote::{
    search_matches, AuthProvider, CatalogProvider, Identity, NewsletterSubscription,
    PersistenceProvider, ProductFilters, RemoteCartItem, SortBy, UserProfile, WishlistItem,
};

#[derive(Default)]
struct Store {
    carts: HashMap<String, Vec<RemoteCartItem>>,
    wishlists: HashMap<String, Vec<WishlistItem>>,
    newsletter: HashMap<String, NewsletterSubscription>,
    users: HashMap<String, UserProfile>,
    identity: Option<Identity>,
}

/// Catalog, persistence and auth held in process memory.
pub struct InMemoryBackend {
    products: Vec<Product>,
    store: Mutex<Store>,
    offline: AtomicBool,
    next_id: AtomicU64,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::with_products(fixture_catalog())
    }
}

impl InMemoryBackend {
    /// Creates a backend seeded with the fixture catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        InMemoryBackend {
            products,
            store: Mutex::new(Store::default()),
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Makes every persistence call fail with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("backend is offline".into()));
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn require_product(&self, product_id: &str) -> RemoteResult<()> {
        if self.products.iter().any(|p| p.id == product_id) {
            Ok(())
        } else {
            Err(RemoteError::not_found("Product", product_id))
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogProvider for InMemoryBackend {
    async fn fetch_products(&self, filters: &ProductFilters) -> RemoteResult<Vec<Product>> {
        let mut matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();

        match filters.sort_by {
            Some(SortBy::PriceLow) => matches.sort_by_key(|p| p.price),
            Some(SortBy::PriceHigh) => matches.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(SortBy::Rating) => matches.sort_by(|a, b| {
                b.rating
                    .unwrap_or(0.0)
                    .total_cmp(&a.rating.unwrap_or(0.0))
            }),
            Some(SortBy::Latest) => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            None => {}
        }

        debug!(count = matches.len(), sort_by = ?filters.sort_by, "Fetched products");

        Ok(matches
            .into_iter()
            .skip(filters.offset)
            .take(filters.limit)
            .collect())
    }

    async fn search_products(&self, query: &str, limit: usize) -> RemoteResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| search_matches(p, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_product_by_id(&self, id: &str) -> RemoteResult<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[async_trait]
impl PersistenceProvider for InMemoryBackend {
    async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        size: Option<&str>,
        color: Option<&str>,
    ) -> RemoteResult<RemoteCartItem> {
        self.ensure_online()?;
        self.require_product(product_id)?;

        let id = self.next_id("cart-item");
        let mut store = self.store();
        let lines = store.carts.entry(user_id.to_string()).or_default();

        let existing = lines.iter_mut().find(|line| {
            line.product_id == product_id
                && size.map_or(true, |s| line.size.as_deref() == Some(s))
                && color.map_or(true, |c| line.color.as_deref() == Some(c))
        });

        if let Some(line) = existing {
            line.quantity += quantity;
            return Ok(line.clone());
        }

        let line = RemoteCartItem {
            id,
            product_id: product_id.to_string(),
            quantity,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        };
        lines.push(line.clone());
        Ok(line)
    }

    async fn update_cart_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> RemoteResult<()> {
        self.ensure_online()?;

        let mut store = self.store();
        let lines = store
            .carts
            .get_mut(user_id)
            .ok_or_else(|| RemoteError::not_found("Cart", user_id))?;

        let mut found = false;
        for line in lines.iter_mut().filter(|l| l.product_id == product_id) {
            line.quantity = quantity;
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(RemoteError::not_found("Cart item", product_id))
        }
    }

    async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> RemoteResult<()> {
        self.ensure_online()?;

        if let Some(lines) = self.store().carts.get_mut(user_id) {
            lines.retain(|l| l.product_id != product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        self.store().carts.remove(user_id);
        Ok(())
    }

    async fn get_user_cart(&self, user_id: &str) -> RemoteResult<Vec<RemoteCartItem>> {
        self.ensure_online()?;
        Ok(self.store().carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn add_to_wishlist(&self, user_id: &str, product_id: &str) -> RemoteResult<WishlistItem> {
        self.ensure_online()?;
        self.require_product(product_id)?;

        let id = self.next_id("wishlist");
        let mut store = self.store();
        let items = store.wishlists.entry(user_id.to_string()).or_default();

        if let Some(existing) = items.iter().find(|i| i.product_id == product_id) {
            return Ok(existing.clone());
        }

        let item = WishlistItem {
            id,
            product_id: product_id.to_string(),
            added_at: Utc::now(),
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn get_wishlist(&self, user_id: &str) -> RemoteResult<Vec<WishlistItem>> {
        self.ensure_online()?;
        Ok(self
            .store()
            .wishlists
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_from_wishlist(&self, user_id: &str, product_id: &str) -> RemoteResult<bool> {
        self.ensure_online()?;

        let mut store = self.store();
        let Some(items) = store.wishlists.get_mut(user_id) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|i| i.product_id != product_id);
        Ok(items.len() != before)
    }

    async fn subscribe_newsletter(&self, email: &str) -> RemoteResult<NewsletterSubscription> {
        self.ensure_online()?;
        validate_email(email).map_err(|e| RemoteError::Rejected(e.to_string()))?;

        let mut store = self.store();
        let subscription = store
            .newsletter
            .entry(email.to_string())
            .or_insert_with(|| NewsletterSubscription {
                email: email.to_string(),
                active: false,
                subscribed_at: Utc::now(),
            });

        if !subscription.active {
            subscription.active = true;
            subscription.subscribed_at = Utc::now();
        }
        Ok(subscription.clone())
    }

    async fn unsubscribe_newsletter(&self, email: &str) -> RemoteResult<bool> {
        self.ensure_online()?;

        match self.store().newsletter.get_mut(email) {
            Some(subscription) => {
                subscription.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_user_profile(&self, user_id: &str) -> RemoteResult<UserProfile> {
        self.ensure_online()?;
        self.store()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| RemoteError::not_found("User", user_id))
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[async_trait]
impl AuthProvider for InMemoryBackend {
    async fn current_identity(&self) -> Option<Identity> {
        self.store().identity.clone()
    }

    /// Signs in by email, creating the profile on first sign-in.
    async fn login(&self, email: &str) -> RemoteResult<Identity> {
        let email = email.trim();
        validate_email(email).map_err(|e| RemoteError::Rejected(e.to_string()))?;

        let mut store = self.store();
        let existing = store
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.id.clone());

        let user_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                store.users.insert(
                    id.clone(),
                    UserProfile {
                        id: id.clone(),
                        email: email.to_string(),
                        first_name: None,
                        last_name: None,
                        dark_mode_preference: false,
                    },
                );
                id
            }
        };

        let identity = Identity {
            user_id,
            email: email.to_string(),
        };
        store.identity = Some(identity.clone());
        Ok(identity)
    }

    async fn logout(&self) -> RemoteResult<()> {
        self.store().identity = None;
        Ok(())
    }
}

// =============================================================================
// Fixture Catalog
// =============================================================================

/// The storefront's home-page catalog.
pub fn fixture_catalog() -> Vec<Product> {
    #[allow(clippy::type_complexity)]
    let rows: [(&str, &str, &str, i64, Option<i64>, &str, &str, &[&str], f32, bool); 8] = [
        ("1", "Classic White Tee", "Essential white t-shirt made from 100% organic cotton",
            2999, None, "Women", "Tops", &["Basic", "Essential", "Cotton"], 4.7, true),
        ("2", "Slim Fit Jeans", "Dark wash denim jeans with a modern slim fit design",
            7999, Some(5999), "Men", "Pants", &["Denim", "Casual", "Slim Fit"], 4.3, true),
        ("3", "Oversized Wool Sweater", "Cozy oversized sweater in luxurious merino wool",
            8999, None, "Women", "Knitwear", &["Cozy", "Winter", "Wool"], 4.9, true),
        ("4", "Leather Crossbody Bag", "Handcrafted leather crossbody bag with adjustable strap",
            14999, Some(11999), "Accessories", "Bags", &["Leather", "Handmade", "Luxury"], 4.8, true),
        ("5", "Linen Blazer", "Lightweight linen blazer perfect for summer occasions",
            12999, None, "Men", "Jackets", &["Linen", "Summer", "Formal"], 4.5, false),
        ("6", "Silk Scarf", "Elegant silk scarf with a vibrant abstract pattern",
            4999, None, "Accessories", "Scarves", &["Silk", "Colorful", "Luxury"], 4.6, false),
        ("7", "Floral Maxi Dress", "Flowing maxi dress with an elegant floral print",
            9999, Some(7999), "Women", "Dresses", &["Floral", "Summer", "Elegant"], 4.7, true),
        ("8", "Minimalist Watch", "Clean, modern timepiece with a genuine leather strap",
            15999, None, "Accessories", "Watches", &["Minimalist", "Timeless", "Leather"], 4.8, true),
    ];

    let epoch = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single();

    rows.iter()
        .enumerate()
        .map(
            |(i, (id, name, description, price, sale, category, subcategory, tags, rating, featured))| {
                let mut product = Product::new(*id, *name, Money::from_cents(*price));
                product.sale_price = sale.map(Money::from_cents);
                product.description = Some(description.to_string());
                product.category = Some(category.to_string());
                product.subcategory = Some(subcategory.to_string());
                product.tags = tags.iter().map(|t| t.to_string()).collect();
                product.rating = Some(*rating);
                product.featured = *featured;
                product.created_at = epoch.map(|e| e + Duration::days(i as i64 * 7));
                product
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_products_sorting_and_paging() {
        let backend = InMemoryBackend::new();

        let cheapest = backend
            .fetch_products(&ProductFilters {
                sort_by: Some(SortBy::PriceLow),
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&cheapest), vec!["1", "6"]);

        let next_page = backend
            .fetch_products(&ProductFilters {
                sort_by: Some(SortBy::PriceLow),
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&next_page), vec!["2", "3"]);

        let latest = backend
            .fetch_products(&ProductFilters {
                sort_by: Some(SortBy::Latest),
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&latest), vec!["8"]);

        let best = backend
            .fetch_products(&ProductFilters {
                sort_by: Some(SortBy::Rating),
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&best), vec!["3"]);
    }

    #[tokio::test]
    async fn test_fetch_products_filters() {
        let backend = InMemoryBackend::new();
        let accessories = backend
            .fetch_products(&ProductFilters {
                category: Some("Accessories".into()),
                featured: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&accessories), vec!["4", "8"]);
    }

    #[tokio::test]
    async fn test_search_products() {
        let backend = InMemoryBackend::new();
        let leather = backend.search_products("leather", 10).await.unwrap();
        assert_eq!(ids(&leather), vec!["4", "8"]);

        assert!(backend.search_products("  ", 10).await.unwrap().is_empty());
        assert_eq!(backend.search_products("summer", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_cart_merges_on_variant() {
        let backend = InMemoryBackend::new();
        backend.add_to_cart("u", "1", 1, Some("M"), Some("White")).await.unwrap();
        backend.add_to_cart("u", "1", 2, Some("M"), Some("White")).await.unwrap();
        backend.add_to_cart("u", "1", 1, Some("L"), None).await.unwrap();

        let cart = backend.get_user_cart("u").await.unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].quantity, 3);

        backend.update_cart_quantity("u", "1", 5).await.unwrap();
        assert!(backend.get_user_cart("u").await.unwrap().iter().all(|l| l.quantity == 5));

        backend.remove_from_cart("u", "1").await.unwrap();
        assert!(backend.get_user_cart("u").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let backend = InMemoryBackend::new();
        let err = backend.add_to_cart("u", "999", 1, None, None).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn test_wishlist_is_idempotent() {
        let backend = InMemoryBackend::new();
        let first = backend.add_to_wishlist("u", "6").await.unwrap();
        let second = backend.add_to_wishlist("u", "6").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(backend.get_wishlist("u").await.unwrap().len(), 1);

        assert!(backend.remove_from_wishlist("u", "6").await.unwrap());
        assert!(!backend.remove_from_wishlist("u", "6").await.unwrap());
    }

    #[tokio::test]
    async fn test_newsletter_reactivates() {
        let backend = InMemoryBackend::new();
        assert!(backend.subscribe_newsletter("ada@b.co").await.unwrap().active);
        assert!(backend.unsubscribe_newsletter("ada@b.co").await.unwrap());
        assert!(backend.subscribe_newsletter("ada@b.co").await.unwrap().active);

        assert!(!backend.unsubscribe_newsletter("nobody@b.co").await.unwrap());
        assert!(backend.subscribe_newsletter("not-an-email").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_fails_persistence_only() {
        let backend = InMemoryBackend::new();
        backend.set_offline(true);

        let err = backend.get_user_cart("u").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(backend.get_product_by_id("1").await.unwrap().is_some());

        backend.set_offline(false);
        assert!(backend.get_user_cart("u").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_reuses_profile() {
        let backend = InMemoryBackend::new();
        assert!(backend.current_identity().await.is_none());

        let first = backend.login("ada@b.co").await.unwrap();
        backend.logout().await.unwrap();
        assert!(backend.current_identity().await.is_none());

        let second = backend.login("ADA@b.co").await.unwrap();
        assert_eq!(first.user_id, second.user_id);

        let profile = backend.get_user_profile(&second.user_id).await.unwrap();
        assert_eq!(profile.email, "ada@b.co");

        assert!(backend.login("nope").await.is_err());
        assert_eq!(backend.redirect_path(Some("/cart")), "/cart");
    }
}
