//! # ObserverSet: non-blocking fan-out over multiple observers
//!
//! [`ObserverSet`] distributes each [`Event`] to every observer **without
//! awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-observer FIFO (queue order).
//! - Panics inside observers are caught and republished as `ObserverPanicked`.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different observers.
//! - No retries on per-observer queue overflow (the event is dropped for that
//!   observer and `ObserverOverflow` is published, unless the dropped event was
//!   itself an overflow report).

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::observers::Observe;

struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out with per-observer bounded queues and worker tasks.
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker per observer.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for obs in observers {
            let cap = obs.queue_capacity().max(1);
            let name = obs.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let worker_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = obs.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        worker_bus.publish(Event::observer_panicked(obs.name(), info));
                    }
                }
            });
            channels.push(ObserverChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fan-out one event to all observers (non-blocking).
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        let is_overflow = ev.is_observer_overflow();

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus.publish(Event::observer_overflow(channel.name, reason));
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
