//! # Emitter: the tagged value source.
//!
//! Two kinds with disjoint capabilities:
//! - [`Emitter::Finite`] holds its values; it replays identically on every
//!   consumption and supports blocking collection.
//! - [`Emitter::Unbounded`] holds a producer; values arrive over time once its
//!   stream is connected. It never supports blocking collection.
//!
//! Constructing an emitter never starts any work.

use std::sync::Arc;

use crate::emitters::{Counter, ProducerRef};
use crate::error::StreamError;
use crate::policies::DelayPolicy;
use crate::stream::Item;

/// Value source at the root of a stream.
pub enum Emitter<T: Item> {
    /// Pre-computed values, delivered with zero latency.
    Finite(Arc<[T]>),
    /// Values produced over time by a dedicated task.
    Unbounded(ProducerRef<T>),
}

impl<T: Item> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        match self {
            Emitter::Finite(values) => Emitter::Finite(Arc::clone(values)),
            Emitter::Unbounded(producer) => Emitter::Unbounded(Arc::clone(producer)),
        }
    }
}

impl<T: Item> Emitter<T> {
    /// Wraps a pre-existing sequence.
    pub fn finite(values: impl IntoIterator<Item = T>) -> Self {
        Emitter::Finite(values.into_iter().collect())
    }

    /// Wraps a producer.
    pub fn unbounded(producer: ProducerRef<T>) -> Self {
        Emitter::Unbounded(producer)
    }

    /// True for [`Emitter::Finite`].
    pub fn is_finite(&self) -> bool {
        matches!(self, Emitter::Finite(_))
    }

    /// Producer name, or `"finite"`.
    pub fn name(&self) -> &str {
        match self {
            Emitter::Finite(_) => "finite",
            Emitter::Unbounded(producer) => producer.name(),
        }
    }
}

impl Emitter<i64> {
    /// Unbounded emitter counting `start, start + step, ...` while `<= bound`,
    /// sleeping per `delay` before each value.
    ///
    /// # Errors
    /// [`StreamError::InvalidStep`] if `step <= 0`.
    ///
    /// # Example
    /// ```rust
    /// use rxflow::{DelayPolicy, Emitter};
    ///
    /// let odds = Emitter::counter(1, 2, 7, DelayPolicy::None).unwrap();
    /// assert_eq!(odds.name(), "counter[1..=7 step 2]");
    /// assert!(Emitter::counter(1, 0, 7, DelayPolicy::None).is_err());
    /// ```
    pub fn counter(start: i64, step: i64, bound: i64, delay: DelayPolicy) -> Result<Self, StreamError> {
        let counter = Counter::new(start, step, bound, delay)?;
        Ok(Emitter::Unbounded(Arc::new(counter)))
    }
}
