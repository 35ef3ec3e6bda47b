//! # Shell State
//!
//! Everything one shell session holds, and the command dispatcher.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ShellState                                     │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │ CartStore        │  │ CheckoutSession  │  │ Providers            │  │
//! │  │ add / qty / rm   │  │ set / next /     │  │ catalog, persistence │  │
//! │  │ cart / clear     │  │ submit / status  │  │ auth (Arc<dyn _>)    │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  login ──► auth.login ──► cart.attach_remote (if mirror_cart)          │
//! │  logout ─► auth.logout ─► cart.detach_remote                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use vault_core::{
    CheckoutState, CoreError, Icon, LineItem, Money, OrderSummary, Product, StepStatus,
    MAX_QUANTITY,
};
use vault_session::{
    AuthProvider, CartSnapshot, CartStore, CatalogProvider, CheckoutSession, Identity,
    InMemoryBackend, NotificationSink, PersistenceProvider, ProductFilters, SessionConfig,
    SessionError, DEFAULT_SEARCH_LIMIT,
};

use crate::commands::{Command, HELP};
use crate::error::{ErrorCode, ShellError};

/// What the read loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

pub struct ShellState {
    config: SessionConfig,
    catalog: Arc<dyn CatalogProvider>,
    persistence: Arc<dyn PersistenceProvider>,
    auth: Arc<dyn AuthProvider>,
    cart: CartStore,
    checkout: CheckoutSession,
}

impl ShellState {
    /// Builds a session whose providers are all served by `backend`.
    pub fn new(
        config: SessionConfig,
        backend: Arc<InMemoryBackend>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let cart = CartStore::new(notifier.clone());
        let checkout = CheckoutSession::new(cart.clone(), &config, notifier);

        ShellState {
            config,
            catalog: backend.clone(),
            persistence: backend.clone(),
            auth: backend,
            cart,
            checkout,
        }
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutSession {
        &self.checkout
    }

    /// Cancels pending order timers and stops cart mirroring.
    pub fn shutdown(&self) {
        self.checkout.teardown();
        self.cart.detach_remote();
    }

    fn money(&self, amount: Money) -> String {
        amount.display_with(self.config.currency_symbol())
    }

    async fn identity(&self) -> Result<Identity, ShellError> {
        self.auth
            .current_identity()
            .await
            .ok_or_else(|| SessionError::NotSignedIn.into())
    }

    async fn product(&self, id: &str) -> Result<Product, ShellError> {
        self.catalog
            .get_product_by_id(id)
            .await?
            .ok_or_else(|| ShellError::not_found("Product", id))
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ShellError> {
        serde_json::to_string_pretty(value)
            .map_err(|e| ShellError::new(ErrorCode::Internal, e.to_string()))
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub async fn execute(&self, command: Command) -> Result<Outcome, ShellError> {
        debug!(?command, "Executing command");

        let output = match command {
            Command::Products { category, sort_by } => {
                let filters = ProductFilters {
                    category,
                    sort_by,
                    ..Default::default()
                };
                let products = self.catalog.fetch_products(&filters).await?;
                self.render_products(&products)
            }
            Command::Search(query) => {
                let products = self
                    .catalog
                    .search_products(&query, DEFAULT_SEARCH_LIMIT)
                    .await?;
                if products.is_empty() {
                    format!("{} No results for \"{}\"", Icon::Search, query)
                } else {
                    self.render_products(&products)
                }
            }
            Command::Show(id) => self.render_product(&self.product(&id).await?),
            Command::Add { id, size, color } => {
                let product = self
                    .product(&id)
                    .await?
                    .with_variant(size.as_deref(), color.as_deref());
                let quantity = self.cart.add_item(&product);
                format!("{} {} × {}", Icon::Plus, product.name, quantity)
            }
            Command::Quantity { id, quantity } => {
                if !self.cart.items().iter().any(|item| item.id == id) {
                    return Err(CoreError::ItemNotFound(id).into());
                }
                if !self.cart.update_quantity(&id, quantity) {
                    return Err(ShellError::usage(format!(
                        "quantity must be between 1 and {}",
                        MAX_QUANTITY
                    )));
                }
                self.render_cart(&self.cart.snapshot())
            }
            Command::Remove(id) => {
                let removed = self
                    .cart
                    .remove_item(&id)
                    .ok_or(CoreError::ItemNotFound(id))?;
                format!("{} {}", Icon::Trash2, removed.name)
            }
            Command::Cart { json: true } => Self::to_json(&self.cart.snapshot())?,
            Command::Cart { json: false } => self.render_cart(&self.cart.snapshot()),
            Command::Clear => {
                self.cart.clear();
                "Cart cleared".to_string()
            }
            Command::Set { field, value } => {
                self.checkout.set_field(field, value)?;
                format!("{} updated", field.label())
            }
            Command::Next => {
                self.checkout.next()?;
                self.render_status(&self.checkout.state())
            }
            Command::Back => {
                self.checkout.back()?;
                self.render_status(&self.checkout.state())
            }
            Command::Cancel => {
                self.checkout.cancel()?;
                self.render_status(&self.checkout.state())
            }
            Command::Review => {
                let summary = self.checkout.order_summary(Utc::now().date_naive());
                self.render_summary(&summary)
            }
            Command::Submit => {
                self.checkout.submit()?;
                format!("{} Processing your order...", Icon::Loader)
            }
            Command::Status { json: true } => Self::to_json(&self.checkout.state())?,
            Command::Status { json: false } => self.render_status(&self.checkout.state()),
            Command::Login(email) => {
                let identity = self.auth.login(&email).await?;
                if self.config.remote.mirror_cart {
                    self.cart
                        .attach_remote(self.persistence.clone(), identity.clone());
                }
                info!(user_id = %identity.user_id, "Signed in");
                format!(
                    "{} Signed in as {} (continue at {})",
                    Icon::User,
                    identity.email,
                    self.auth.redirect_path(Some("/checkout"))
                )
            }
            Command::Logout => {
                self.auth.logout().await?;
                self.cart.detach_remote();
                "Signed out".to_string()
            }
            Command::Wishlist => {
                let identity = self.identity().await?;
                let saved = self.persistence.get_wishlist(&identity.user_id).await?;
                if saved.is_empty() {
                    format!("{} Your wishlist is empty", Icon::Heart)
                } else {
                    let mut products = Vec::with_capacity(saved.len());
                    for entry in &saved {
                        if let Some(product) =
                            self.catalog.get_product_by_id(&entry.product_id).await?
                        {
                            products.push(product);
                        }
                    }
                    self.render_products(&products)
                }
            }
            Command::Save(id) => {
                let identity = self.identity().await?;
                let product = self.product(&id).await?;
                self.persistence
                    .add_to_wishlist(&identity.user_id, &product.id)
                    .await?;
                format!("{} Saved {}", Icon::Heart, product.name)
            }
            Command::Unsave(id) => {
                let identity = self.identity().await?;
                if !self
                    .persistence
                    .remove_from_wishlist(&identity.user_id, &id)
                    .await?
                {
                    return Err(ShellError::not_found("Wishlist item", &id));
                }
                format!("Removed {} from your wishlist", id)
            }
            Command::Subscribe(email) => {
                let subscription = self.persistence.subscribe_newsletter(&email).await?;
                format!("Subscribed {}", subscription.email)
            }
            Command::Unsubscribe(email) => {
                if self.persistence.unsubscribe_newsletter(&email).await? {
                    format!("Unsubscribed {}", email)
                } else {
                    return Err(ShellError::not_found("Subscription", &email));
                }
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Print(output))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render_products(&self, products: &[Product]) -> String {
        let mut out = String::new();
        for p in products {
            let price = match p.sale_price {
                Some(sale) => format!("{} (was {})", self.money(sale), self.money(p.price)),
                None => self.money(p.price),
            };
            let _ = writeln!(out, "  [{}] {:<28} {}", p.id, p.name, price);
        }
        let _ = write!(out, "{} product(s)", products.len());
        out
    }

    fn render_product(&self, p: &Product) -> String {
        let mut out = format!("[{}] {}\n", p.id, p.name);
        if let Some(description) = &p.description {
            let _ = writeln!(out, "  {}", description);
        }
        let _ = writeln!(out, "  price: {}", self.money(p.effective_price()));
        if let Some(rating) = p.rating {
            let _ = writeln!(out, "  rating: {:.1}", rating);
        }
        if !p.tags.is_empty() {
            let _ = writeln!(out, "  tags: {}", p.tags.join(", "));
        }
        out.trim_end().to_string()
    }

    fn render_line(&self, item: &LineItem) -> String {
        let variant: Vec<&str> = [item.size.as_deref(), item.color.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let variant = if variant.is_empty() {
            String::new()
        } else {
            format!(" ({})", variant.join(", "))
        };
        format!(
            "  [{}] {}{} × {}  {}",
            item.id,
            item.name,
            variant,
            item.quantity,
            self.money(item.line_total())
        )
    }

    fn render_cart(&self, snapshot: &CartSnapshot) -> String {
        if snapshot.items.is_empty() {
            return format!("{} Your cart is empty", Icon::ShoppingBag);
        }

        let totals = &snapshot.totals;
        let mut out = format!(
            "{} Cart ({} items)\n",
            Icon::ShoppingBag,
            totals.total_quantity
        );
        for item in &snapshot.items {
            let _ = writeln!(out, "{}", self.render_line(item));
        }
        let shipping = if totals.is_free_shipping() {
            "Free".to_string()
        } else {
            self.money(totals.shipping)
        };
        let _ = writeln!(out, "  Subtotal  {}", self.money(totals.subtotal));
        let _ = writeln!(out, "  {} Shipping  {}", Icon::Truck, shipping);
        let _ = writeln!(out, "  Tax       {}", self.money(totals.tax));
        let _ = write!(out, "  Total     {}", self.money(totals.total));
        out
    }

    fn render_summary(&self, summary: &OrderSummary) -> String {
        let mut out = String::from("Order summary\n");
        for line in &summary.lines {
            let _ = writeln!(
                out,
                "  {} × {}  {}",
                line.name,
                line.quantity,
                self.money(line.line_total)
            );
        }
        let totals = &summary.totals;
        let shipping = if totals.is_free_shipping() {
            "Free".to_string()
        } else {
            self.money(totals.shipping)
        };
        let _ = writeln!(out, "  Subtotal  {}", self.money(totals.subtotal));
        let _ = writeln!(out, "  Shipping  {}", shipping);
        let _ = writeln!(out, "  Tax       {}", self.money(totals.tax));
        let _ = writeln!(out, "  Total     {}", self.money(totals.total));
        let _ = write!(
            out,
            "  {} Estimated delivery {}",
            Icon::Truck,
            summary.estimated_delivery.format("%b %-d, %Y")
        );
        out
    }

    fn render_status(&self, state: &CheckoutState) -> String {
        let mut out = String::new();

        let bar: Vec<String> = self
            .checkout
            .step_indicators()
            .into_iter()
            .map(|ind| match ind.status {
                StepStatus::Completed => format!("{} {}", Icon::CheckCircle, ind.label),
                StepStatus::Current => format!("[{}. {}]", ind.number, ind.label),
                StepStatus::Upcoming => format!("{}. {}", ind.number, ind.label),
            })
            .collect();
        let _ = writeln!(out, "{}", bar.join(&format!(" {} ", Icon::ChevronRight)));

        if state.is_processing {
            let _ = writeln!(out, "{} Processing your order...", Icon::Loader);
        }
        if let Some(confirmation) = &state.confirmation {
            let _ = writeln!(
                out,
                "{} Order #{} confirmed for {}",
                Icon::CheckCircle,
                confirmation.order_number,
                confirmation.email
            );
            let _ = writeln!(
                out,
                "  {} total, arriving by {}",
                self.money(confirmation.totals.total),
                confirmation.estimated_delivery.format("%b %-d, %Y")
            );
        }
        for (field, message) in state.errors.iter() {
            let _ = writeln!(out, "  {} {}: {}", Icon::X, field, message);
        }

        out.trim_end().to_string()
    }
}

impl Drop for ShellState {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_session::{ChannelSink, NoOpSink, Notification};

    fn shell() -> ShellState {
        ShellState::new(
            SessionConfig::default(),
            Arc::new(InMemoryBackend::new()),
            Arc::new(NoOpSink),
        )
    }

    async fn run(state: &ShellState, line: &str) -> Result<String, ShellError> {
        match Command::parse(line)?.map(|c| state.execute(c)) {
            Some(fut) => match fut.await? {
                Outcome::Print(out) => Ok(out),
                Outcome::Quit => Ok("quit".into()),
            },
            None => Ok(String::new()),
        }
    }

    #[tokio::test]
    async fn test_add_and_render_cart() {
        let state = shell();
        run(&state, "add 2 32 Indigo").await.unwrap();
        run(&state, "add 2").await.unwrap();

        let out = run(&state, "cart").await.unwrap();
        assert!(out.contains("Slim Fit Jeans (32, Indigo) × 2"));
        assert!(out.contains("Subtotal  $119.98"));
        assert!(out.contains("Shipping  Free"));
        assert!(out.contains("Total     $128.38"));
    }

    #[tokio::test]
    async fn test_unknown_product_and_item() {
        let state = shell();
        let err = run(&state, "add 99").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = run(&state, "rm 1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        run(&state, "add 1").await.unwrap();
        let err = run(&state, "qty 1 0").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
        assert_eq!(state.cart().totals().total_quantity, 1);
    }

    #[tokio::test]
    async fn test_checkout_validation_is_reported() {
        let state = shell();
        let err = run(&state, "next").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("firstName: First name is required"));

        let err = run(&state, "submit").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Checkout);
    }

    #[tokio::test]
    async fn test_wishlist_needs_sign_in() {
        let state = shell();
        let err = run(&state, "wishlist").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Auth);

        run(&state, "login ada@stylevault.com").await.unwrap();
        run(&state, "wishlist 6").await.unwrap();
        run(&state, "save 6").await.unwrap();
        let out = run(&state, "wishlist").await.unwrap();
        assert!(out.contains("Silk Scarf"));
        assert!(out.ends_with("1 product(s)"));
    }

    #[tokio::test]
    async fn test_login_pushes_existing_cart() {
        let backend = Arc::new(InMemoryBackend::new());
        let state = ShellState::new(SessionConfig::default(), backend.clone(), Arc::new(NoOpSink));

        run(&state, "add 1 M").await.unwrap();
        run(&state, "qty 1 2").await.unwrap();
        run(&state, "login ada@stylevault.com").await.unwrap();
        state.cart().flush_remote().await;

        let identity = backend.current_identity().await.unwrap();
        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].product_id, "1");
        assert_eq!(remote[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_login_mirrors_cart() {
        let backend = Arc::new(InMemoryBackend::new());
        let (sink, mut toasts) = ChannelSink::new();
        let state = ShellState::new(SessionConfig::default(), backend.clone(), Arc::new(sink));

        run(&state, "login ada@stylevault.com").await.unwrap();
        run(&state, "add 6").await.unwrap();
        state.cart().flush_remote().await;

        let identity = backend.current_identity().await.unwrap();
        let remote = backend.get_user_cart(&identity.user_id).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(
            toasts.try_recv().unwrap(),
            Notification::success("Silk Scarf added to cart!")
        );

        run(&state, "logout").await.unwrap();
        assert!(!state.cart().is_mirroring());
    }

    #[tokio::test]
    async fn test_status_json() {
        let state = shell();
        let out = run(&state, "status --json").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["step"], "shipping");
        assert_eq!(value["isProcessing"], false);
    }

    #[tokio::test]
    async fn test_quit() {
        assert_eq!(run(&shell(), "quit").await.unwrap(), "quit");
    }
}
