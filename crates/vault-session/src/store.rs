//! # Cart Store
//!
//! The shared, observable cart handle.
//!
//! ## Store Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CartStore                                       │
//! │                                                                         │
//! │  add_item / update_quantity / remove_item / clear                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐  snapshot   ┌───────────────────────────────┐    │
//! │  │ Mutex<Cart>      │ ──────────► │ watch::Sender<CartSnapshot>   │──► UI│
//! │  └──────────────────┘             └───────────────────────────────┘    │
//! │       │                                                                 │
//! │       ├──► NotificationSink ("<name> added to cart!")                  │
//! │       │                                                                 │
//! │       └──► MirrorOp ──► mpsc ──► mirror task ──► PersistenceProvider   │
//! │                                  (only while a shopper is attached,     │
//! │                                   seeded with the local lines)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Local state is authoritative. A failed mirror call is logged and raised
//! as an error notification; it never undoes the local change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vault_core::{calculate_totals, Cart, CartTotals, LineItem, Product};

use crate::notify::{NoOpSink, Notification, NotificationSink};
use crate::error::RemoteResult;
use crate::remote::{Identity, PersistenceProvider};

/// Items plus derived totals, as published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl CartSnapshot {
    fn of(cart: &Cart) -> Self {
        CartSnapshot {
            items: cart.items().to_vec(),
            totals: calculate_totals(cart.items()),
        }
    }
}

// =============================================================================
// Remote Mirror
// =============================================================================

/// A cart mutation to replay against the remote cart.
#[derive(Debug)]
enum MirrorOp {
    Add {
        product_id: String,
        size: Option<String>,
        color: Option<String>,
    },
    Update {
        product_id: String,
        quantity: i64,
    },
    Remove {
        product_id: String,
    },
    Clear,
    /// Replaces the remote cart with these lines.
    Seed(Vec<LineItem>),
    Flush(oneshot::Sender<()>),
}

struct Mirror {
    tx: mpsc::UnboundedSender<MirrorOp>,
    task: JoinHandle<()>,
}

/// Applies mirror operations in order until the store detaches.
async fn run_mirror(
    mut rx: mpsc::UnboundedReceiver<MirrorOp>,
    persistence: Arc<dyn PersistenceProvider>,
    identity: Identity,
    notifier: Arc<dyn NotificationSink>,
) {
    let user = identity.user_id.as_str();
    debug!(user_id = %user, "Cart mirror started");

    while let Some(op) = rx.recv().await {
        let op = match op {
            MirrorOp::Flush(done) => {
                let _ = done.send(());
                continue;
            }
            op => op,
        };

        let result = match &op {
            MirrorOp::Add {
                product_id,
                size,
                color,
            } => persistence
                .add_to_cart(user, product_id, 1, size.as_deref(), color.as_deref())
                .await
                .map(|_| ()),
            MirrorOp::Update {
                product_id,
                quantity,
            } => {
                persistence
                    .update_cart_quantity(user, product_id, *quantity)
                    .await
            }
            MirrorOp::Remove { product_id } => persistence.remove_from_cart(user, product_id).await,
            MirrorOp::Clear => persistence.clear_cart(user).await,
            MirrorOp::Seed(lines) => seed_remote(persistence.as_ref(), user, lines).await,
            MirrorOp::Flush(_) => Ok(()),
        };

        if let Err(e) = result {
            warn!(user_id = %user, ?op, error = %e, retryable = e.is_retryable(), "Cart mirror failed");
            notifier.notify(Notification::error("Couldn't sync your cart"));
        }
    }

    debug!(user_id = %user, "Cart mirror stopped");
}

async fn seed_remote(
    persistence: &dyn PersistenceProvider,
    user: &str,
    lines: &[LineItem],
) -> RemoteResult<()> {
    persistence.clear_cart(user).await?;
    for line in lines {
        persistence
            .add_to_cart(
                user,
                &line.id,
                line.quantity,
                line.size.as_deref(),
                line.color.as_deref(),
            )
            .await?;
    }
    Ok(())
}

// =============================================================================
// Cart Store
// =============================================================================

struct StoreInner {
    cart: Mutex<Cart>,
    snapshot_tx: watch::Sender<CartSnapshot>,
    notifier: Arc<dyn NotificationSink>,
    mirror: Mutex<Option<Mirror>>,
}

/// Cloneable handle to the session's cart.
///
/// ## Example
/// ```rust
/// use vault_core::{Money, Product};
/// use vault_session::CartStore;
///
/// let store = CartStore::default();
/// let rx = store.subscribe();
///
/// store.add_item(&Product::new("6", "Silk Scarf", Money::from_cents(4999)));
/// assert_eq!(rx.borrow().totals.total_quantity, 1);
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreInner>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Arc::new(NoOpSink))
    }
}

impl CartStore {
    /// Creates an empty store that reports to `notifier`.
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        let (snapshot_tx, _) = watch::channel(CartSnapshot::default());

        CartStore {
            inner: Arc::new(StoreInner {
                cart: Mutex::new(Cart::new()),
                snapshot_tx,
                notifier,
                mirror: Mutex::new(None),
            }),
        }
    }

    fn cart(&self) -> MutexGuard<'_, Cart> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mirror(&self) -> MutexGuard<'_, Option<Mirror>> {
        self.inner
            .mirror
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, cart: &Cart) {
        self.inner.snapshot_tx.send_replace(CartSnapshot::of(cart));
    }

    fn send_mirror(&self, op: MirrorOp) {
        if let Some(mirror) = self.mirror().as_ref() {
            if mirror.tx.send(op).is_err() {
                warn!("Cart mirror task is gone; dropping remote update");
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity if it is already in the cart.
    ///
    /// ## Returns
    /// The line's quantity after the add.
    pub fn add_item(&self, product: &Product) -> i64 {
        let (quantity, mirrored) = {
            let mut cart = self.cart();
            let before = cart.get(&product.id).map_or(0, |line| line.quantity);
            let quantity = cart.add_item(product);
            self.publish(&cart);

            // The remote line takes the local line's variant, so a merge
            // under a different size or color stays one line remotely.
            let mirrored = (quantity > before)
                .then(|| cart.get(&product.id))
                .flatten()
                .map(|line| MirrorOp::Add {
                    product_id: line.id.clone(),
                    size: line.size.clone(),
                    color: line.color.clone(),
                });
            (quantity, mirrored)
        };

        info!(product_id = %product.id, quantity, "Added to cart");
        self.inner
            .notifier
            .notify(Notification::success(format!("{} added to cart!", product.name)));
        if let Some(op) = mirrored {
            self.send_mirror(op);
        }

        quantity
    }

    /// Sets a line's quantity. Quantities below 1 and unknown ids are ignored.
    ///
    /// ## Returns
    /// `true` if the cart changed.
    pub fn update_quantity(&self, id: &str, quantity: i64) -> bool {
        let changed = {
            let mut cart = self.cart();
            let changed = cart.update_quantity(id, quantity);
            if changed {
                self.publish(&cart);
            }
            changed
        };

        if !changed {
            debug!(product_id = %id, quantity, "Ignored quantity update");
            return false;
        }

        debug!(product_id = %id, quantity, "Updated quantity");
        self.send_mirror(MirrorOp::Update {
            product_id: id.to_string(),
            quantity,
        });
        true
    }

    /// Removes a line.
    pub fn remove_item(&self, id: &str) -> Option<LineItem> {
        let removed = {
            let mut cart = self.cart();
            let removed = cart.remove_item(id);
            if removed.is_some() {
                self.publish(&cart);
            }
            removed
        }?;

        info!(product_id = %id, "Removed from cart");
        self.inner
            .notifier
            .notify(Notification::info("Item removed from cart"));
        self.send_mirror(MirrorOp::Remove {
            product_id: id.to_string(),
        });
        Some(removed)
    }

    /// Empties the cart.
    pub fn clear(&self) {
        {
            let mut cart = self.cart();
            cart.clear();
            self.publish(&cart);
        }

        info!("Cart cleared");
        self.send_mirror(MirrorOp::Clear);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current items and totals.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::of(&self.cart())
    }

    pub fn items(&self) -> Vec<LineItem> {
        self.cart().items().to_vec()
    }

    /// Totals recomputed from the current items.
    pub fn totals(&self) -> CartTotals {
        calculate_totals(self.cart().items())
    }

    pub fn is_empty(&self) -> bool {
        self.cart().is_empty()
    }

    /// Receiver that observes a fresh snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    // =========================================================================
    // Remote Mirroring
    // =========================================================================

    /// Starts mirroring mutations to `identity`'s remote cart.
    ///
    /// The remote cart is first replaced with the current local lines.
    /// Replaces any previous attachment. Must be called inside a Tokio
    /// runtime.
    pub fn attach_remote(&self, persistence: Arc<dyn PersistenceProvider>, identity: Identity) {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(user_id = %identity.user_id, "Mirroring cart to remote");

        let task = tokio::spawn(run_mirror(
            rx,
            persistence,
            identity,
            self.inner.notifier.clone(),
        ));

        // Cart lock held so no mutation lands between the seed and the swap.
        let previous = {
            let cart = self.cart();
            let _ = tx.send(MirrorOp::Seed(cart.items().to_vec()));
            self.mirror().replace(Mirror { tx, task })
        };

        if let Some(previous) = previous {
            previous.task.abort();
        }
    }

    /// Stops mirroring. Operations already queued are dropped.
    pub fn detach_remote(&self) {
        if let Some(mirror) = self.mirror().take() {
            mirror.task.abort();
            info!("Stopped mirroring cart");
        }
    }

    pub fn is_mirroring(&self) -> bool {
        self.mirror().is_some()
    }

    /// Waits until every mirror operation queued so far has been applied.
    pub async fn flush_remote(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        let sent = match self.mirror().as_ref() {
            Some(mirror) => mirror.tx.send(MirrorOp::Flush(done_tx)).is_ok(),
            None => false,
        };

        if sent {
            let _ = done_rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use crate::notify::{ChannelSink, NotificationLevel};
    use crate::remote::{AuthProvider, PersistenceProvider};
    use vault_core::Money;

    fn product(id: &str, name: &str, cents: i64) -> Product {
        Product::new(id, name, Money::from_cents(cents))
    }

    #[test]
    fn test_add_notifies_and_publishes() {
        let (sink, mut rx) = ChannelSink::new();
        let store = CartStore::new(Arc::new(sink));
        let snapshots = store.subscribe();

        let sneakers = product("101", "White Sneakers", 6999);
        assert_eq!(store.add_item(&sneakers), 1);
        assert_eq!(store.add_item(&sneakers), 2);

        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.level, NotificationLevel::Success);
        assert_eq!(toast.message, "White Sneakers added to cart!");

        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.totals.subtotal.cents(), 13998);
        assert!(snapshot.totals.is_free_shipping());
    }

    #[test]
    fn test_remove_notifies_only_when_removed() {
        let (sink, mut rx) = ChannelSink::new();
        let store = CartStore::new(Arc::new(sink));
        store.add_item(&product("101", "White Sneakers", 6999));
        store.add_item(&product("205", "Cashmere Scarf", 4999));
        let _ = rx.try_recv();
        let _ = rx.try_recv();

        assert!(store.remove_item("101").is_some());
        assert_eq!(rx.try_recv().unwrap(), Notification::info("Item removed from cart"));

        assert!(store.remove_item("101").is_none());
        assert!(rx.try_recv().is_err());

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "205");
    }

    #[test]
    fn test_update_below_one_is_ignored() {
        let store = CartStore::default();
        store.add_item(&product("1", "Tee", 2999));
        let mut snapshots = store.subscribe();
        snapshots.mark_unchanged();

        assert!(!store.update_quantity("1", 0));
        assert!(!snapshots.has_changed().unwrap());
        assert_eq!(store.totals().total_quantity, 1);

        assert!(store.update_quantity("1", 3));
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(store.totals().subtotal.cents(), 8997);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let store = CartStore::default();
        store.add_item(&product("1", "Classic White Tee", 2999));

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["items"][0]["id"], "1");
        assert_eq!(json["items"][0]["salePrice"], serde_json::Value::Null);
        assert_eq!(json["totals"]["totalQuantity"], 1);
        assert_eq!(json["totals"]["subtotal"], 2999);
    }

    #[test]
    fn test_clear() {
        let store = CartStore::default();
        store.add_item(&product("1", "Tee", 2999));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.snapshot(), CartSnapshot::default());
    }

    #[tokio::test]
    async fn test_mirror_replays_mutations_in_order() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();

        let store = CartStore::default();
        store.attach_remote(backend.clone(), identity.clone());

        store.add_item(&product("1", "Classic White Tee", 2999).with_variant(Some("M"), None));
        store.add_item(&product("1", "Classic White Tee", 2999).with_variant(Some("M"), None));
        store.add_item(&product("6", "Silk Scarf", 4999));
        store.update_quantity("6", 4);
        store.remove_item("1");
        store.flush_remote().await;

        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].product_id, "6");
        assert_eq!(remote[0].quantity, 4);

        store.clear();
        store.flush_remote().await;
        assert!(backend.get_user_cart(&identity.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_follows_local_variant_on_merge() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();

        let store = CartStore::default();
        store.attach_remote(backend.clone(), identity.clone());

        store.add_item(&product("1", "Classic White Tee", 2999).with_variant(Some("S"), None));
        store.add_item(&product("1", "Classic White Tee", 2999).with_variant(Some("L"), None));
        assert!(store.update_quantity("1", 5));
        store.flush_remote().await;

        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].size.as_deref(), Some("S"));
        let remote_quantity: i64 = remote.iter().map(|line| line.quantity).sum();
        assert_eq!(remote_quantity, store.totals().total_quantity);
    }

    #[tokio::test]
    async fn test_add_at_max_quantity_is_not_mirrored() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();

        let store = CartStore::default();
        store.attach_remote(backend.clone(), identity.clone());
        store.add_item(&product("1", "Classic White Tee", 2999));
        store.update_quantity("1", vault_core::MAX_QUANTITY);
        assert_eq!(
            store.add_item(&product("1", "Classic White Tee", 2999)),
            vault_core::MAX_QUANTITY
        );
        store.flush_remote().await;

        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        assert_eq!(remote[0].quantity, vault_core::MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_attach_seeds_remote_with_local_lines() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();
        backend
            .add_to_cart(&identity.user_id, "2", 1, None, None)
            .await
            .unwrap();

        let store = CartStore::default();
        store.add_item(&product("1", "Classic White Tee", 2999).with_variant(Some("M"), None));
        store.add_item(&product("6", "Silk Scarf", 4999));
        store.update_quantity("6", 3);

        store.attach_remote(backend.clone(), identity.clone());
        store.flush_remote().await;

        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        let lines: Vec<(&str, i64, Option<&str>)> = remote
            .iter()
            .map(|line| (line.product_id.as_str(), line.quantity, line.size.as_deref()))
            .collect();
        assert_eq!(lines, vec![("1", 1, Some("M")), ("6", 3, None)]);
    }

    #[tokio::test]
    async fn test_mirror_failure_keeps_local_state() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();
        backend.set_offline(true);

        let (sink, mut rx) = ChannelSink::new();
        let store = CartStore::new(Arc::new(sink));
        store.attach_remote(backend.clone(), identity);

        store.add_item(&product("1", "Classic White Tee", 2999));
        store.flush_remote().await;

        assert_eq!(store.items().len(), 1);
        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Success);
        assert_eq!(
            rx.recv().await.unwrap(),
            Notification::error("Couldn't sync your cart")
        );
    }

    #[tokio::test]
    async fn test_detach_stops_mirroring() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = backend.login("ada@b.co").await.unwrap();

        let store = CartStore::default();
        store.attach_remote(backend.clone(), identity.clone());
        assert!(store.is_mirroring());
        store.detach_remote();
        assert!(!store.is_mirroring());

        store.add_item(&product("1", "Classic White Tee", 2999));
        store.flush_remote().await;
        assert!(backend.get_user_cart(&identity.user_id).await.unwrap().is_empty());
    }
}
