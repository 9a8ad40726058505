//! # Emission handle.
//!
//! [`Emit`] is what a producer pushes values through. It enforces the emitter
//! contract: once completed, further emissions fail with
//! [`StreamError::EmitterClosed`] and nothing reaches the pipeline.
//!
//! ## Rules
//! - `emit` and `complete` are serialized by one lock, so no value can slip in
//!   after completion even if clones of the handle race.
//! - `complete` is idempotent; only the first call notifies downstream.
//! - Every accepted value publishes `ValueEmitted` on the bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StreamError;
use crate::events::{Bus, Event, EventKind};
use crate::stream::Item;
use crate::stream::sink::SinkRef;

/// Handle a producer pushes values through.
///
/// Cheap to clone; all clones share the same closed state.
pub struct Emit<T> {
    inner: Arc<EmitInner<T>>,
}

struct EmitInner<T> {
    name: Arc<str>,
    sink: SinkRef<T>,
    closed: Mutex<bool>,
    emitted: AtomicU64,
    bus: Bus,
}

impl<T> Clone for Emit<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Item> Emit<T> {
    pub(crate) fn new(name: Arc<str>, sink: SinkRef<T>, bus: Bus) -> Self {
        Self {
            inner: Arc::new(EmitInner {
                name,
                sink,
                closed: Mutex::new(false),
                emitted: AtomicU64::new(0),
                bus,
            }),
        }
    }

    /// Pushes one value downstream.
    ///
    /// # Errors
    /// [`StreamError::EmitterClosed`] if the emitter has already completed.
    pub fn emit(&self, value: T) -> Result<(), StreamError> {
        let closed = self
            .inner
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(StreamError::EmitterClosed {
                emitter: self.inner.name.to_string(),
            });
        }
        self.inner.sink.on_next(value);
        let n = self.inner.emitted.fetch_add(1, Ordering::Relaxed) + 1;
        drop(closed);

        self.inner.bus.publish(
            Event::new(EventKind::ValueEmitted)
                .with_emitter(Arc::clone(&self.inner.name))
                .with_count(n),
        );
        Ok(())
    }

    /// Signals completion downstream. Returns `false` if already completed.
    pub fn complete(&self) -> bool {
        let mut closed = self
            .inner
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return false;
        }
        *closed = true;
        self.inner.sink.on_complete();
        true
    }

    /// True once [`complete`](Self::complete) has been called.
    pub fn is_closed(&self) -> bool {
        *self
            .inner
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of values accepted so far.
    pub fn emitted(&self) -> u64 {
        self.inner.emitted.load(Ordering::Relaxed)
    }

    /// Name of the emitter this handle feeds.
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}
