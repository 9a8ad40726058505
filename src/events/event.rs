//! # Runtime events emitted by emitters, connections and subscriptions.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Emitter events**: producer lifecycle and per-value emission
//! - **Connection events**: connect and shutdown of hot streams
//! - **Subscription events**: attach, detach, completion, callback panics
//! - **Observer events**: failures of the observers themselves
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use rxflow::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::EmitterFailed)
//!     .with_emitter("counter[1..=7 step 2]")
//!     .with_reason("boom")
//!     .with_count(3);
//!
//! assert_eq!(ev.kind, EventKind::EmitterFailed);
//! assert_eq!(ev.emitter.as_deref(), Some("counter[1..=7 step 2]"));
//! assert_eq!(ev.count, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Emitter events ===
    /// Producer task started.
    ///
    /// Sets: `emitter`
    EmitterStarting,

    /// One value passed from a producer into the pipeline.
    ///
    /// Sets: `emitter`, `count` (values emitted so far, 1-based)
    ValueEmitted,

    /// Producer signalled completion.
    ///
    /// Sets: `emitter`, `count` (total values emitted)
    EmitterCompleted,

    /// Producer returned an error; its production is terminated.
    ///
    /// Sets: `emitter`, `reason`, `count`
    EmitterFailed,

    /// Producer stopped because its connection was cancelled.
    ///
    /// Sets: `emitter`, `count`
    EmitterStopped,

    // === Connection events ===
    /// A connectable stream was connected.
    ///
    /// Sets: `count` (number of unbounded producers spawned), `reason` (their
    /// emitter names, comma-separated, in start order)
    StreamConnected,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All producers stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some producers did not stop in time.
    ///
    /// Sets: `reason` (stuck emitter names)
    GraceExceeded,

    // === Subscription events ===
    /// Subscription registered.
    ///
    /// Sets: `subscription`
    Subscribed,

    /// Subscription deactivated.
    ///
    /// Sets: `subscription`, `count` (values delivered before detach)
    Unsubscribed,

    /// Stream completed for this subscription.
    ///
    /// Sets: `subscription`, `count` (values delivered)
    SubscriptionCompleted,

    /// The value callback panicked; delivery continues with the next value.
    ///
    /// Sets: `subscription`, `reason`
    CallbackPanicked,

    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets: `emitter` (observer name), `reason`
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets: `emitter` (observer name), `reason`
    ObserverOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Emitter (or observer) name, if applicable.
    pub emitter: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Value counter, meaning depends on the kind.
    pub count: Option<u64>,
    /// Subscription id, if applicable.
    pub subscription: Option<u64>,
    /// Grace or wait bound in milliseconds (compact).
    pub bound_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            emitter: None,
            reason: None,
            count: None,
            subscription: None,
            bound_ms: None,
        }
    }

    /// Attaches an emitter name.
    #[inline]
    pub fn with_emitter(mut self, emitter: impl Into<Arc<str>>) -> Self {
        self.emitter = Some(emitter.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a value counter.
    #[inline]
    pub fn with_count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches a bound (stored as milliseconds).
    #[inline]
    pub fn with_bound(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.bound_ms = Some(ms);
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_emitter(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_emitter(observer)
            .with_reason(info)
    }

    /// True for `ObserverOverflow` reports; dropping one of those publishes nothing new.
    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }
}
