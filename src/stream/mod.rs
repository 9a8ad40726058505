//! # Stream composition.
//!
//! A [`Stream`] is an immutable handle over an operator chain rooted at one or
//! more [`Emitter`](crate::Emitter)s. Operators (`merge`, `buffer`, `map`,
//! `filter`, `to_list`, `flatten_iterable`) return a **new** stream and never
//! start production.
//!
//! ## Wiring
//! Consumption turns the chain into a graph of sinks, leaves last:
//! ```text
//! Stream::buffer(9).map(sort).flatten_iterable()
//!
//!   wire(consumer) ─► FlattenSink ─► MapSink ─► BufferSink ─► MergeInput ─┬─ Finite [0]
//!                                                                          ├─ Counter odds
//!                                                                          └─ Counter evens
//!   Plan { cold: [Finite [0]], hot: [odds, evens] }
//! ```
//! Finite sources become **cold** launches (run synchronously, in registration
//! order). Unbounded sources become **hot** launches (one spawned producer each,
//! started only by `connect`).

mod ops;
mod pipeline;
pub(crate) mod sink;

pub use pipeline::Stream;

/// Bound shared by every value that travels through a stream.
///
/// Values are cloned for replay of finite sources and for fan-out to
/// several subscriptions.
pub trait Item: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Item for T {}
