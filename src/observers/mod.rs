//! # Event observers for the rxflow runtime.
//!
//! This module provides the [`Observe`] trait and the fan-out used to deliver
//! runtime [`Event`](crate::Event)s to user code (logging, metrics, alerts).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   EmitterActor / Emit / Connection ── publish(Event) ──► Bus
//!                                                           │
//!                                       runtime listener ◄──┘
//!                                                │
//!                                        ObserverSet::emit
//!                                 ┌──────────────┼──────────────┐
//!                                 ▼              ▼              ▼
//!                            [queue O1]     [queue O2]     [queue ON]
//!                                 ▼              ▼              ▼
//!                            LogWriter        Metrics        Custom
//! ```
//!
//! Observers never see stream values; those go to subscriptions.

mod observe;
mod set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observe::Observe;
pub use set::ObserverSet;
