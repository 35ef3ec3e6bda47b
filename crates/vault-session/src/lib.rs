//! # vault-session: Session Runtime for StyleVault
//!
//! Everything in the cart/checkout flow that needs a clock, a task or a
//! collaborator. The rules themselves live in `vault-core`.
//!
//! ## Runtime Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         vault-session                                   │
//! │                                                                         │
//! │   UI / shell                                                            │
//! │      │ subscribe()                       │ subscribe()                  │
//! │      ▼                                   ▼                              │
//! │  ┌────────────────┐   clear() at t=5s ┌──────────────────┐             │
//! │  │   CartStore    │ ◄──────────────── │ CheckoutSession  │             │
//! │  │   (store.rs)   │   items() at t=0  │  (session.rs)    │             │
//! │  └───────┬────────┘ ────────────────► └────────┬─────────┘             │
//! │          │ mirror                              │ place()                │
//! │          ▼                                     ▼                        │
//! │  ┌────────────────────┐             ┌──────────────────┐               │
//! │  │ PersistenceProvider│             │ OrderSimulator   │               │
//! │  │ (remote.rs)        │             │ (simulator.rs)   │               │
//! │  └────────────────────┘             └──────────────────┘               │
//! │                                                                         │
//! │  NotificationSink (notify.rs) receives toasts from both sides.         │
//! │  SessionConfig (config.rs) supplies delays and display settings.       │
//! │  InMemoryBackend (memory.rs) implements every provider for the shell.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use vault_session::{CartStore, CheckoutSession, SessionConfig, TracingSink};
//!
//! # async fn demo() {
//! let config = SessionConfig::load_or_default(None);
//! let sink = Arc::new(TracingSink);
//! let cart = CartStore::new(sink.clone());
//! let checkout = CheckoutSession::new(cart.clone(), &config, sink);
//!
//! let mut states = checkout.subscribe();
//! while states.changed().await.is_ok() {
//!     println!("{:?}", states.borrow().step);
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod notify;
pub mod remote;
pub mod session;
pub mod simulator;
pub mod store;

pub use config::{CheckoutSettings, DisplaySettings, RemoteSettings, SessionConfig, Theme};
pub use error::{RemoteError, RemoteResult, SessionError, SessionResult};
pub use memory::{fixture_catalog, InMemoryBackend};
pub use notify::{
    ChannelSink, NoOpSink, Notification, NotificationLevel, NotificationSink, TracingSink,
};
pub use remote::{
    redirect_path, search_matches, AuthProvider, CatalogProvider, Identity,
    NewsletterSubscription, PersistenceProvider, ProductFilters, RemoteCartItem, SortBy,
    UserProfile, WishlistItem, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_LIMIT,
};
pub use session::CheckoutSession;
pub use simulator::OrderSimulator;
pub use store::{CartSnapshot, CartStore};
