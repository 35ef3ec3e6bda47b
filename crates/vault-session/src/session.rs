//! # Checkout Session
//!
//! Wraps the pure [`CheckoutMachine`] with the timers of order submission.
//!
//! ## Submission Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       submit() on Review                                │
//! │                                                                         │
//! │  t = 0       begin_submit: payment re-validated, is_processing = true   │
//! │     │                                                                   │
//! │     ▼        spawned task ────────────────────────────────┐            │
//! │  t = 2 s     simulator.place() → complete(confirmation)   │            │
//! │              toast "Order placed successfully!"           │ abort()    │
//! │     │                                                     │ on         │
//! │     ▼                                                     │ teardown   │
//! │  t = 5 s     cart.clear() + machine.reset()               │ or Drop    │
//! │              back to an empty Shipping step ◄─────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every state change is published on a `watch` channel. Locks are never
//! held across an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vault_core::{
    CheckoutForm, CheckoutMachine, CheckoutState, CheckoutStep, CoreResult, FormField,
    OrderSummary, StepIndicator,
};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::notify::{Notification, NotificationSink};
use crate::simulator::OrderSimulator;
use crate::store::CartStore;

struct SessionInner {
    machine: Mutex<CheckoutMachine>,
    state_tx: watch::Sender<CheckoutState>,
    cart: CartStore,
    simulator: OrderSimulator,
    cleanup_delay: Duration,
    delivery_days: i64,
    notifier: Arc<dyn NotificationSink>,
}

impl SessionInner {
    fn machine(&self) -> MutexGuard<'_, CheckoutMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on the machine and publishes the resulting state.
    fn update<T>(&self, f: impl FnOnce(&mut CheckoutMachine) -> T) -> T {
        let mut machine = self.machine();
        let out = f(&mut machine);
        self.state_tx.send_replace(machine.state().clone());
        out
    }
}

/// The shopper's checkout flow.
///
/// ## Lifecycle
/// - Created per checkout page
/// - [`submit`](Self::submit) spawns the timed order task
/// - [`teardown`](Self::teardown) (or dropping the session) cancels it
pub struct CheckoutSession {
    inner: Arc<SessionInner>,
    submit_task: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl CheckoutSession {
    pub fn new(
        cart: CartStore,
        config: &SessionConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_simulator(
            cart,
            OrderSimulator::from_config(config),
            config.cleanup_delay(),
            config.checkout.delivery_days,
            notifier,
        )
    }

    pub fn with_simulator(
        cart: CartStore,
        simulator: OrderSimulator,
        cleanup_delay: Duration,
        delivery_days: i64,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(CheckoutState::default());

        CheckoutSession {
            inner: Arc::new(SessionInner {
                machine: Mutex::new(CheckoutMachine::new()),
                state_tx,
                cart,
                simulator,
                cleanup_delay,
                delivery_days,
                notifier,
            }),
            submit_task: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    fn ensure_live(&self) -> SessionResult<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(SessionError::Disposed);
        }
        Ok(())
    }

    fn submit_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.submit_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Form & Navigation
    // =========================================================================

    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> SessionResult<()> {
        self.ensure_live()?;
        let value = value.into();
        self.inner.update(|m| m.set_field(field, value))?;
        Ok(())
    }

    /// Validates the current step and advances.
    pub fn next(&self) -> SessionResult<CheckoutStep> {
        self.ensure_live()?;
        let result: CoreResult<CheckoutStep> = self.inner.update(CheckoutMachine::next);

        match &result {
            Ok(step) => debug!(%step, "Checkout advanced"),
            Err(e) => debug!(error = %e, "Checkout step rejected"),
        }
        Ok(result?)
    }

    pub fn back(&self) -> SessionResult<CheckoutStep> {
        self.ensure_live()?;
        Ok(self.inner.update(CheckoutMachine::back)?)
    }

    /// Abandons the flow and returns to Shipping.
    pub fn cancel(&self) -> SessionResult<()> {
        self.ensure_live()?;
        Ok(self.inner.update(CheckoutMachine::cancel)?)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Places the order for the current cart.
    ///
    /// Returns as soon as processing has started; progress is observed via
    /// [`subscribe`](Self::subscribe). Must be called inside a Tokio runtime.
    ///
    /// ## Errors
    /// - [`SessionError::Disposed`] after teardown
    /// - `Core` errors from the machine: not on Review, already busy, or
    ///   invalid payment fields
    pub fn submit(&self) -> SessionResult<()> {
        self.ensure_live()?;
        self.inner.update(CheckoutMachine::begin_submit)?;

        let form = self.inner.machine().form().clone();
        let items = self.inner.cart.items();
        info!(lines = items.len(), "Submitting order");

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let confirmation = inner.simulator.place(&form, &items).await;
            let order_number = confirmation.order_number.clone();

            if let Err(e) = inner.update(|m| m.complete(confirmation)) {
                warn!(error = %e, "Order finished after the checkout moved on");
                return;
            }
            inner
                .notifier
                .notify(Notification::success("Order placed successfully!"));

            tokio::time::sleep(inner.cleanup_delay).await;

            inner.cart.clear();
            inner.update(CheckoutMachine::reset);
            info!(%order_number, "Checkout reset after order");
        });

        if let Some(previous) = self.submit_task().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// True while a submitted order has not finished its cleanup.
    pub fn is_submitting(&self) -> bool {
        self.submit_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Cancels pending timers. Later mutations fail with `Disposed`.
    pub fn teardown(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(task) = self.submit_task().take() {
            task.abort();
            debug!("Cancelled pending order task");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self) -> CheckoutState {
        self.inner.machine().state().clone()
    }

    pub fn form(&self) -> CheckoutForm {
        self.inner.machine().form().clone()
    }

    pub fn step_indicators(&self) -> Vec<StepIndicator> {
        self.inner.machine().step_indicators()
    }

    /// Review-step summary of the current cart.
    pub fn order_summary(&self, today: NaiveDate) -> OrderSummary {
        OrderSummary::build(&self.inner.cart.items(), today, self.inner.delivery_days)
    }

    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Receiver that observes the state after every change.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.inner.state_tx.subscribe()
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
