//! # rxflow
//!
//! **rxflow** is a small hot/cold event-stream engine on top of tokio.
//!
//! It provides emitters (finite value lists and unbounded asynchronous
//! producers), composable stream operators, blocking collection for finite
//! streams, and live subscriptions to connectable (hot) streams. Producer
//! lifecycle, failures and subscription changes are reported on an event bus
//! instead of being thrown into subscriber callbacks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Emitter    │   │   Emitter    │   │   Emitter    │
//!     │  (finite)    │   │ (unbounded)  │   │ (unbounded)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Stream (operator chain: merge / filter / map / buffer / flatten) │
//! └──────┬───────────────────────────────────────────────┬────────────┘
//!        │ collect_blocking (finite only)                │ Runtime::publish
//!        ▼                                               ▼
//!   Vec<T> in registration order            ConnectableStream ──► connect()
//!                                                        │
//!                              ┌─────────────────────────┼──────────────────┐
//!                              ▼                         ▼                  ▼
//!                      finite sources            EmitterActor        EmitterActor
//!                    (drained in connect)       (spawned task)      (spawned task)
//!                              │                         │                  │
//!                              └──────────────► Hub ◄────┴──────────────────┘
//!                                               │ fan-out
//!                                  ┌────────────┼────────────┐
//!                                  ▼            ▼            ▼
//!                            Subscription  Subscription  Subscription
//!                           (serialized callback per subscription)
//!
//! Side channel:
//!   EmitterActor / Emit / Connection / Subscription ── Event ──► Bus ──► ObserverSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle of an unbounded emitter
//! ```text
//! connect()
//!   ├─► publish EmitterStarting{ emitter }
//!   ├─► producer.produce(emit, child_token)
//!   │       │
//!   │       ├─ each emit(v) ──► pipeline ──► publish ValueEmitted{ count }
//!   │       │
//!   │       ├─ Ok            ──► publish EmitterCompleted
//!   │       ├─ Err(Canceled) ──► publish EmitterStopped
//!   │       └─ Err / panic   ──► publish EmitterFailed{ reason }
//!   │
//!   └─► emit.complete() ──► input counts as finished (merge completes after all inputs)
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Emitters**      | Finite value lists, counters with delays, custom producers.       | [`Emitter`], [`Produce`], [`ProduceFn`]     |
//! | **Operators**     | merge, filter, map, buffer, to_list, flatten_iterable.            | [`Stream`]                                  |
//! | **Pull**          | Blocking collection of finite streams.                            | [`Stream::collect_blocking`]                |
//! | **Push**          | Publish, subscribe, connect; wait, cancel, graceful shutdown.     | [`Runtime`], [`ConnectableStream`], [`Connection`], [`Subscription`] |
//! | **Delays**        | None, fixed or uniform random (optionally seeded) emission delay. | [`DelayPolicy`]                             |
//! | **Observer API**  | Hook into runtime events (logging, metrics, custom observers).    | [`Observe`], [`Event`], [`EventKind`]       |
//! | **Errors**        | Typed errors for composition, production and connections.        | [`StreamError`], [`RuntimeError`]           |
//! | **Configuration** | Centralize runtime settings.                                      | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use rxflow::{Config, DelayPolicy, Emitter, Runtime, Stream};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Pull: finite sources, blocking collection in registration order.
//!     let pulled = Stream::merge_all([
//!         Stream::just([0]),
//!         Stream::just([1, 3, 5, 7]),
//!         Stream::just([2, 4, 6, 8]),
//!     ])
//!     .collect_blocking(Vec::new())?;
//!     assert_eq!(pulled, vec![0, 1, 3, 5, 7, 2, 4, 6, 8]);
//!
//!     // Push: delayed counters, merged with a finite source, sorted through one batch.
//!     let delay = DelayPolicy::uniform(Duration::from_millis(10));
//!     let odds = Emitter::counter(1, 2, 7, delay)?;
//!     let evens = Emitter::counter(2, 2, 8, delay)?;
//!     let sorted = Stream::merge_all([Stream::from(odds), Stream::from(evens), Stream::just([0])])
//!         .buffer(9)?
//!         .map(|mut batch: Vec<i64>| {
//!             batch.sort_unstable();
//!             batch
//!         })
//!         .flatten_iterable();
//!
//!     let rt = Runtime::builder(Config::default()).build();
//!     let hot = rt.publish(&sorted);
//!     let sub = hot.subscribe(|v: i64| println!("{v}"));
//!     let mut conn = hot.connect()?;
//!     conn.wait(delay.settle_bound(4) + Duration::from_millis(100)).await?;
//!     sub.done().await;
//!     Ok(())
//! }
//! ```
mod core;
mod emitters;
mod error;
mod events;
mod observers;
mod policies;
mod stream;
mod subscription;

// ---- Public re-exports ----

pub use crate::core::{Config, ConnectableStream, Connection, Runtime, RuntimeBuilder};
pub use emitters::{Counter, Emit, Emitter, Produce, ProduceFn, ProducerRef};
pub use error::{RuntimeError, StreamError};
pub use events::{Bus, Event, EventKind};
pub use observers::{Observe, ObserverSet};
pub use policies::{DelayPolicy, DelaySampler};
pub use stream::{Item, Stream};
pub use subscription::Subscription;

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
