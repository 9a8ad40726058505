//! # Live consumption: subscriptions.
//!
//! A [`Subscription`] is the handle returned when a callback is attached to a
//! stream. Behind it sits a `Delivery` sink that serializes the callback: values
//! pushed concurrently by several producer tasks reach the callback one at a
//! time, in each producer's own order.
//!
//! ## Rules
//! - **At most once**: each value reaches an active subscription once; nothing is
//!   replayed to subscriptions attached after a hot stream was connected.
//! - **Unsubscribe** only stops future deliveries. Producers keep running.
//! - **Panics** in the value callback are caught, reported as `CallbackPanicked`,
//!   and delivery continues with the next value.
//! - **Completion** flips [`Subscription::is_completed`] exactly once and runs the
//!   completion callback if the subscription is still active.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::events::{Bus, Event, EventKind};
use crate::stream::Item;
use crate::stream::sink::Sink;

static SUBSCRIPTION_IDS: AtomicU64 = AtomicU64::new(1);

type ValueFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

/// State shared between a [`Subscription`] handle and its delivery sink.
struct SubscriptionState {
    id: u64,
    active: AtomicBool,
    delivered: AtomicU64,
    done: watch::Sender<bool>,
    bus: Bus,
}

/// Handle to a registered callback.
///
/// Dropping the handle does **not** unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    state: Arc<SubscriptionState>,
}

impl Subscription {
    /// Process-unique subscription id (also carried by events).
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Deactivates future deliveries. Idempotent; already delivered values are unaffected.
    pub fn unsubscribe(&self) {
        if self.state.active.swap(false, Ordering::AcqRel) {
            self.state.bus.publish(
                Event::new(EventKind::Unsubscribed)
                    .with_subscription(self.state.id)
                    .with_count(self.delivered()),
            );
        }
    }

    /// True until [`unsubscribe`](Self::unsubscribe) is called.
    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// Number of values the callback has returned from (panicking calls excluded).
    pub fn delivered(&self) -> u64 {
        self.state.delivered.load(Ordering::Acquire)
    }

    /// True once the stream has completed for this subscription.
    pub fn is_completed(&self) -> bool {
        *self.state.done.borrow()
    }

    /// Waits until the stream completes for this subscription.
    pub async fn done(&self) {
        let mut rx = self.state.done.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("active", &self.is_active())
            .field("delivered", &self.delivered())
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Sink that invokes one subscription's callbacks.
pub(crate) struct Delivery<T> {
    state: Arc<SubscriptionState>,
    on_value: Mutex<ValueFn<T>>,
    on_complete: Mutex<Option<CompleteFn>>,
}

impl<T: Item> Delivery<T> {
    /// Creates the sink and publishes `Subscribed`.
    pub(crate) fn new(bus: Bus, on_value: ValueFn<T>, on_complete: Option<CompleteFn>) -> Arc<Self> {
        let (done, _) = watch::channel(false);
        let state = Arc::new(SubscriptionState {
            id: SUBSCRIPTION_IDS.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            delivered: AtomicU64::new(0),
            done,
            bus,
        });
        state
            .bus
            .publish(Event::new(EventKind::Subscribed).with_subscription(state.id));

        Arc::new(Self {
            state,
            on_value: Mutex::new(on_value),
            on_complete: Mutex::new(on_complete),
        })
    }

    pub(crate) fn handle(&self) -> Subscription {
        Subscription {
            state: Arc::clone(&self.state),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    fn report_panic(&self, payload: Box<dyn std::any::Any + Send>) {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        self.state.bus.publish(
            Event::new(EventKind::CallbackPanicked)
                .with_subscription(self.state.id)
                .with_reason(info),
        );
    }
}

impl<T: Item> Sink<T> for Delivery<T> {
    fn on_next(&self, value: T) {
        if !self.is_active() {
            return;
        }
        let mut f = self.on_value.lock().unwrap_or_else(PoisonError::into_inner);
        // re-check under the lock: unsubscribe may have raced the wait
        if !self.is_active() {
            return;
        }
        let callback = &mut *f;
        match catch_unwind(AssertUnwindSafe(|| callback(value))) {
            Ok(()) => {
                self.state.delivered.fetch_add(1, Ordering::AcqRel);
            }
            Err(payload) => {
                drop(f);
                self.report_panic(payload);
            }
        }
    }

    fn on_complete(&self) {
        if self.state.done.send_replace(true) {
            return;
        }
        if self.is_active() {
            let callback = self
                .on_complete
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(callback) = callback {
                if let Err(payload) = catch_unwind(AssertUnwindSafe(callback)) {
                    self.report_panic(payload);
                }
            }
        }
        self.state.bus.publish(
            Event::new(EventKind::SubscriptionCompleted)
                .with_subscription(self.state.id)
                .with_count(self.state.delivered.load(Ordering::Acquire)),
        );
    }
}
