//! # Core observer trait
//!
//! `Observe` is the extension point for plugging custom event handlers into the
//! runtime. Each observer is driven by a dedicated worker loop fed by a bounded
//! queue owned by the [`ObserverSet`](crate::ObserverSet).
//!
//! ## Contract
//! - Implementations may be slow; they do **not** block producers, subscriptions
//!   or other observers.
//! - Each observer declares its queue capacity via [`Observe::queue_capacity`].
//!   On overflow, events for that observer are dropped and reported as
//!   `ObserverOverflow`.
//!
//! ## Example
//! ```rust
//! use rxflow::{Event, EventKind, Observe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicU64);
//!
//! #[async_trait::async_trait]
//! impl Observe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::EmitterFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for runtime event observers.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this observer's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
