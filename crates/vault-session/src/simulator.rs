//! # Order Submission Simulator
//!
//! Stands in for a payment backend: waits out a processing delay and
//! produces a synthetic confirmation. It never fails.
//!
//! ```text
//!  place(form, items)
//!       │
//!       ├── sleep(processing_delay)          (2 s by default)
//!       │
//!       └── OrderConfirmation {
//!               order_id:  Uuid::new_v4()
//!               order_no:  6 digits from order_id
//!               email:     form.email
//!               totals:    calculate_totals(items)
//!               delivery:  today + delivery_days
//!           }
//! ```

use std::time::Duration;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use vault_core::{calculate_totals, CheckoutForm, LineItem, OrderConfirmation};

use crate::config::SessionConfig;

/// Simulated order placement.
#[derive(Debug, Clone)]
pub struct OrderSimulator {
    processing_delay: Duration,
    delivery_days: i64,
}

impl OrderSimulator {
    pub fn new(processing_delay: Duration, delivery_days: i64) -> Self {
        OrderSimulator {
            processing_delay,
            delivery_days,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.processing_delay(), config.checkout.delivery_days)
    }

    pub fn processing_delay(&self) -> Duration {
        self.processing_delay
    }

    /// Waits out the processing delay, then issues a confirmation for `items`.
    pub async fn place(&self, form: &CheckoutForm, items: &[LineItem]) -> OrderConfirmation {
        tokio::time::sleep(self.processing_delay).await;

        let confirmation = OrderConfirmation::new(
            Uuid::new_v4(),
            form.email.clone(),
            Utc::now(),
            calculate_totals(items),
            self.delivery_days,
        );

        info!(
            order_number = %confirmation.order_number,
            total = %confirmation.totals.total,
            lines = items.len(),
            "Order placed"
        );

        confirmation
    }
}

impl Default for OrderSimulator {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
