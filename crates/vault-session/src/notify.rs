//! # Notifications
//!
//! Fire-and-forget toasts raised by cart and checkout actions.
//!
//! ```text
//! CartStore::add_item ──────► Success "White Sneakers added to cart!"
//! CartStore::remove_item ───► Info    "Item removed from cart"
//! CheckoutSession (2 s) ────► Success "Order placed successfully!"
//! Remote mirror failure ────► Error   "Couldn't sync your cart"
//! ```
//!
//! Sinks never fail and never block; a sink with nobody listening simply
//! drops the message.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

// =============================================================================
// Sink Trait
// =============================================================================

/// Receiver of notifications (implemented by the UI layer).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Discards every notification. Used in tests.
pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn notify(&self, _notification: Notification) {}
}

/// Writes notifications to the tracing log.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => error!(message = %notification.message, "notification"),
            level => info!(?level, message = %notification.message, "notification"),
        }
    }
}

/// Forwards notifications over an unbounded channel.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates the sink and the receiver the UI drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelSink { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // Receiver gone means the UI has shut down.
        let _ = self.tx.send(notification);
    }
}
