//! # Connectable (hot) streams.
//!
//! [`ConnectableStream`] separates subscription from production: callbacks are
//! registered first, then [`ConnectableStream::connect`] starts the sources once
//! and every value is fanned out to all subscriptions attached at that moment.
//!
//! ## Rules
//! - `connect` succeeds once; a second call fails with `AlreadyConnected`.
//! - Finite sources are drained synchronously inside `connect`, in registration
//!   order, before any unbounded producer is spawned.
//! - Subscriptions attached after a value was pushed never see it (no replay).
//! - Subscriptions attached after the stream completed are completed immediately.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::actor::{Launcher, connected_event};
use super::connection::Connection;
use crate::{
    error::StreamError,
    events::Bus,
    stream::{
        Item, Stream,
        sink::{Plan, Sink, SinkRef},
    },
    subscription::{Delivery, Subscription},
};

/// Fan-out point between a connected stream and its subscriptions.
struct Hub<T> {
    state: RwLock<HubState<T>>,
}

struct HubState<T> {
    subs: Vec<Arc<Delivery<T>>>,
    completed: bool,
}

impl<T: Item> Hub<T> {
    fn new() -> Self {
        Self {
            state: RwLock::new(HubState {
                subs: Vec::new(),
                completed: false,
            }),
        }
    }

    fn attach(&self, delivery: Arc<Delivery<T>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.completed {
            drop(state);
            delivery.on_complete();
            return;
        }
        state.subs.push(delivery);
    }
}

impl<T: Item> Sink<T> for Hub<T> {
    fn on_next(&self, value: T) {
        // deliver outside the lock so callbacks may subscribe
        let subs = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subs
            .clone();
        for sub in subs.iter().filter(|s| s.is_active()) {
            sub.on_next(value.clone());
        }
    }

    fn on_complete(&self) {
        let subs = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.completed = true;
            mem::take(&mut state.subs)
        };
        for sub in subs {
            sub.on_complete();
        }
    }
}

/// A stream whose sources start only when [`connect`](Self::connect) is called.
///
/// Created by [`Runtime::publish`](crate::Runtime::publish).
///
/// # Example
/// ```rust
/// use rxflow::{Config, Runtime, Stream};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let rt = Runtime::builder(Config::default()).build();
/// let hot = rt.publish(&Stream::just([1, 2, 3]));
///
/// let sub = hot.subscribe(|v: i32| println!("got {v}"));
/// let mut conn = hot.connect().unwrap();
/// conn.join().await;
/// assert_eq!(sub.delivered(), 3);
/// assert!(hot.connect().is_err());
/// # }
/// ```
pub struct ConnectableStream<T: Item> {
    stream: Stream<T>,
    hub: Arc<Hub<T>>,
    bus: Bus,
    token: CancellationToken,
    grace: Duration,
    connected: AtomicBool,
}

impl<T: Item> ConnectableStream<T> {
    pub(crate) fn new(stream: Stream<T>, bus: Bus, token: CancellationToken, grace: Duration) -> Self {
        Self {
            stream,
            hub: Arc::new(Hub::new()),
            bus,
            token,
            grace,
            connected: AtomicBool::new(false),
        }
    }

    /// Registers a value callback.
    pub fn subscribe(&self, on_value: impl FnMut(T) + Send + 'static) -> Subscription {
        self.attach(Delivery::new(self.bus.clone(), Box::new(on_value), None))
    }

    /// Registers a value callback and a completion callback.
    ///
    /// The completion callback runs once, when every source has finished, unless the
    /// subscription was cancelled before that.
    pub fn subscribe_with(
        &self,
        on_value: impl FnMut(T) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Subscription {
        self.attach(Delivery::new(
            self.bus.clone(),
            Box::new(on_value),
            Some(Box::new(on_complete)),
        ))
    }

    fn attach(&self, delivery: Arc<Delivery<T>>) -> Subscription {
        let handle = delivery.handle();
        self.hub.attach(delivery);
        handle
    }

    /// True once [`connect`](Self::connect) has succeeded.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Starts every source of the stream.
    ///
    /// Finite sources are delivered before this returns; unbounded ones are spawned
    /// onto the tokio runtime and keep running after it returns.
    ///
    /// # Errors
    /// [`StreamError::AlreadyConnected`] on every call after the first.
    pub fn connect(&self) -> Result<Connection, StreamError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            return Err(StreamError::AlreadyConnected);
        }
        let token = self.token.child_token();
        let mut plan = Plan::new();
        self.stream.wire(Arc::clone(&self.hub) as SinkRef<T>, &mut plan);

        plan.run_cold();
        let producers = plan.launch_hot(&Launcher::new(self.bus.clone(), token.clone()));
        self.bus.publish(connected_event(&producers));
        Ok(Connection::new(producers, token, self.bus.clone(), self.grace))
    }
}
