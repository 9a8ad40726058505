//! Emission delay policies.
//!
//! This module groups the knobs that control **how long** an unbounded emitter
//! waits before each emission.
//!
//! ## Contents
//! - [`DelayPolicy`] what to wait (none / fixed / uniform random below a bound)
//! - [`DelaySampler`] per-producer sampler owning its own random generator
//!
//! ## Quick wiring
//! ```text
//! Emitter::counter(start, step, bound, DelayPolicy)
//!      └─► Counter::produce() calls policy.sampler() once per run
//!           └─► sampler.next() before every emission
//! ```
//!
//! ## Defaults
//! - `DelayPolicy::None` (emit as fast as the pipeline accepts).
//! - `DelayPolicy::Uniform { seed: None, .. }` draws its seed from the thread RNG;
//!   pass `Some(seed)` for reproducible runs.

mod delay;

pub use delay::{DelayPolicy, DelaySampler};
