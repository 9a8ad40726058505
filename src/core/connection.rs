//! # Connection: handle to the producers started by one `connect`.
//!
//! A [`Connection`] owns the join handles of the unbounded producers and the
//! cancellation token they observe.
//!
//! ## Shutdown path
//! ```text
//! join_or_signal()
//!   ├─ all producers finished            → Ok(())
//!   └─ SIGINT / SIGTERM / Ctrl-C
//!        └─► Bus.publish(ShutdownRequested)
//!        └─► shutdown():
//!               ├─ token.cancel()         → producers stop at their next await
//!               └─ wait up to grace:
//!                    ├─ Ok (all joined)   → Bus.publish(AllStoppedWithin)
//!                    └─ grace exceeded    → Bus.publish(GraceExceeded)
//!                                           Err(RuntimeError::GraceExceeded { stuck })
//! ```
//!
//! Dropping a `Connection` detaches its producers; they run to completion.

use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

use super::{actor::Launched, shutdown};
use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Handle to the producers of a connected stream.
pub struct Connection {
    producers: Vec<Launched>,
    token: CancellationToken,
    bus: Bus,
    grace: Duration,
}

impl Connection {
    pub(crate) fn new(producers: Vec<Launched>, token: CancellationToken, bus: Bus, grace: Duration) -> Self {
        Self {
            producers,
            token,
            bus,
            grace,
        }
    }

    /// Names of the unbounded emitters started by this connection, in start order.
    pub fn emitters(&self) -> Vec<&str> {
        self.producers.iter().map(|p| &*p.name).collect()
    }

    /// True if every producer has finished.
    pub fn is_finished(&self) -> bool {
        self.producers.iter().all(Launched::is_finished)
    }

    /// Requests cancellation of every producer without waiting.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits until every producer has finished.
    ///
    /// Cancel-safe: a handle is released only after its task has been joined.
    pub async fn join(&mut self) {
        for p in &mut self.producers {
            if let Some(handle) = p.handle.as_mut() {
                let _ = handle.await;
                p.handle = None;
            }
        }
    }

    /// Waits at most `bound` for every producer to finish.
    ///
    /// # Errors
    /// [`RuntimeError::WaitExceeded`] listing the emitters still running.
    pub async fn wait(&mut self, bound: Duration) -> Result<(), RuntimeError> {
        let deadline = Instant::now() + bound;
        for p in &mut self.producers {
            let Some(handle) = p.handle.as_mut() else {
                continue;
            };
            if timeout_at(deadline, handle).await.is_err() {
                break;
            }
            p.handle = None;
        }

        let pending = self.pending();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::WaitExceeded { bound, pending })
        }
    }

    /// Cancels every producer and waits up to the configured grace period.
    ///
    /// Publishes `AllStoppedWithin` on success, `GraceExceeded` otherwise.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] listing the emitters that did not stop.
    pub async fn shutdown(&mut self) -> Result<(), RuntimeError> {
        self.cancel();
        let grace = self.grace;
        match self.wait(grace).await {
            Ok(()) => {
                self.bus
                    .publish(Event::new(EventKind::AllStoppedWithin).with_bound(grace));
                Ok(())
            }
            Err(_) => {
                let stuck = self.pending();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_bound(grace)
                        .with_reason(stuck.join(",")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Waits for every producer to finish, or for a termination signal.
    ///
    /// On a signal, publishes `ShutdownRequested` and runs [`shutdown`](Self::shutdown).
    /// If the signal handlers cannot be installed, this behaves like [`join`](Self::join).
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] if shutdown did not finish within grace.
    pub async fn join_or_signal(&mut self) -> Result<(), RuntimeError> {
        let signal = tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => Some(res),
            _ = self.join() => None,
        };
        match signal {
            None => Ok(()),
            Some(Ok(())) => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                self.shutdown().await
            }
            Some(Err(_)) => {
                self.join().await;
                Ok(())
            }
        }
    }

    fn pending(&self) -> Vec<String> {
        self.producers
            .iter()
            .filter(|p| !p.is_finished())
            .map(|p| p.name.to_string())
            .collect()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("emitters", &self.emitters())
            .field("finished", &self.is_finished())
            .finish()
    }
}
