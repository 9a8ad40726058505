//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used as the
//! side-channel of the stream runtime. Producer failures, connection lifecycle
//! and subscription changes are reported here instead of being thrown into
//! subscriber callbacks.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: emitter actors, `Emit` handles, `ConnectableStream::connect`,
//!   `Connection` shutdown, subscriptions, `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the runtime listener (fans out to `ObserverSet`) and any
//!   receiver obtained from `Runtime::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
