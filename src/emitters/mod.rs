//! # Value sources.
//!
//! This module provides the leaves of every pipeline:
//! - [`Emitter`] - tagged source: `Finite` (pre-computed, replayable) or `Unbounded` (producer-driven)
//! - [`Produce`] - trait for async producers behind unbounded emitters
//! - [`ProduceFn`] - closure-backed producer
//! - [`Counter`] - arithmetic progression with an optional per-emission delay
//! - [`Emit`] - handle a producer pushes values through

mod counter;
mod emit;
mod emitter;
mod produce;
mod produce_fn;

pub use counter::Counter;
pub use emit::Emit;
pub use emitter::Emitter;
pub use produce::{Produce, ProducerRef};
pub use produce_fn::ProduceFn;
