//! Runtime core: connection and production lifecycle.
//!
//! This module contains the runtime that turns hot streams into running
//! producers. The public API from this module is [`Runtime`] (with its
//! [`RuntimeBuilder`] and [`Config`]), [`ConnectableStream`] and [`Connection`].
//!
//! ## Lifecycle
//! ```text
//! Stream ──► Runtime::publish ──► ConnectableStream
//!                                   ├─ subscribe(cb) ×N   (register first)
//!                                   └─ connect()
//!                                        ├─ wire stream ─► Hub (fan-out to subscriptions)
//!                                        ├─ publish StreamConnected
//!                                        ├─ drain finite sources (synchronously)
//!                                        └─ spawn one EmitterActor per unbounded source
//!                                                     └─► Connection { producers, token }
//! ```
//!
//! Internal modules:
//! - [`actor`]: runs one producer with cancellation and event publishing;
//! - [`connectable`]: publish/subscribe/connect and the subscription hub;
//! - [`connection`]: waiting on, cancelling and shutting down producers;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod builder;
mod config;
mod connectable;
mod connection;
mod runtime;
mod shutdown;

pub(crate) use actor::{Launched, Launcher};
pub use builder::RuntimeBuilder;
pub use config::Config;
pub use connectable::ConnectableStream;
pub use connection::Connection;
pub use runtime::Runtime;
