//! # The [`Stream`] handle.
//!
//! A stream is a cheap, cloneable, immutable description of a pipeline. It is
//! consumed in one of two ways:
//!
//! - **pull**: [`Stream::collect_blocking`] drains a finite stream into a `Vec`
//!   on the calling thread;
//! - **push**: [`Runtime::subscribe`](crate::Runtime::subscribe) or
//!   [`Runtime::publish`](crate::Runtime::publish) + `connect` deliver values to
//!   callbacks as producers emit them.
//!
//! ## Example
//! ```rust
//! use rxflow::Stream;
//!
//! let all = Stream::just([0])
//!     .merge(&Stream::just([1, 3, 5, 7]))
//!     .merge(&Stream::just([2, 4, 6, 8]));
//!
//! assert_eq!(
//!     all.collect_blocking(Vec::new()).unwrap(),
//!     vec![0, 1, 3, 5, 7, 2, 4, 6, 8]
//! );
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::emitters::Emitter;
use crate::error::StreamError;

use super::Item;
use super::ops::{BufferNode, FilterNode, FlattenNode, MapNode, MergeNode, SourceNode};
use super::sink::{Node, Plan, Sink, SinkRef};

/// Immutable, composable handle over an operator chain.
///
/// Cloning is cheap (one `Arc`). Operators borrow `self` and return a new stream.
pub struct Stream<T: Item> {
    node: Arc<dyn Node<T>>,
}

impl<T: Item> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: Item> From<Emitter<T>> for Stream<T> {
    fn from(emitter: Emitter<T>) -> Self {
        Stream::from_emitter(emitter)
    }
}

impl<T: Item> Stream<T> {
    fn from_node(node: impl Node<T> + 'static) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Wraps a single emitter.
    pub fn from_emitter(emitter: Emitter<T>) -> Self {
        Self::from_node(SourceNode { emitter })
    }

    /// Finite stream over the given values.
    pub fn just(values: impl IntoIterator<Item = T>) -> Self {
        Self::from_emitter(Emitter::finite(values))
    }

    /// Finite stream that completes without values.
    pub fn empty() -> Self {
        Self::just(Vec::new())
    }

    /// Values of both streams, each exactly once.
    ///
    /// For finite inputs the order is `self` first, then `other`. Unbounded
    /// inputs interleave in arrival order; only each input's own order is kept.
    pub fn merge(&self, other: &Stream<T>) -> Stream<T> {
        Self::merge_all([self.clone(), other.clone()])
    }

    /// Merges any number of streams; completes when all of them complete.
    pub fn merge_all(streams: impl IntoIterator<Item = Stream<T>>) -> Stream<T> {
        Self::from_node(MergeNode {
            inputs: streams.into_iter().collect(),
        })
    }

    /// Applies `f` to every value.
    pub fn map<U: Item>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Stream<U> {
        Stream::from_node(MapNode {
            up: self.clone(),
            f: Arc::new(f),
        })
    }

    /// Keeps the values for which `pred` returns `true`.
    pub fn filter(&self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Stream<T> {
        Self::from_node(FilterNode {
            up: self.clone(),
            pred: Arc::new(pred),
        })
    }

    /// Groups consecutive values into batches of exactly `size`.
    ///
    /// A final shorter batch is emitted on completion if values remain.
    ///
    /// # Errors
    /// [`StreamError::InvalidBatchSize`] if `size == 0`.
    pub fn buffer(&self, size: usize) -> Result<Stream<Vec<T>>, StreamError> {
        if size == 0 {
            return Err(StreamError::InvalidBatchSize { size });
        }
        Ok(Stream::from_node(BufferNode {
            up: self.clone(),
            size: Some(size),
        }))
    }

    /// Emits one `Vec` with every value when the stream completes
    /// (an empty `Vec` for an empty stream).
    pub fn to_list(&self) -> Stream<Vec<T>> {
        Stream::from_node(BufferNode {
            up: self.clone(),
            size: None,
        })
    }

    /// True if every source of this stream is finite.
    pub fn is_finite(&self) -> bool {
        self.node.is_finite()
    }

    /// Drains the stream on the calling thread and returns its values in
    /// emission order, or `default` if it produced none.
    ///
    /// Finite sources deliver synchronously, so the call returns only after
    /// the stream has completed.
    ///
    /// # Errors
    /// [`StreamError::UnboundedStream`] if any source is unbounded.
    pub fn collect_blocking(&self, default: Vec<T>) -> Result<Vec<T>, StreamError> {
        if !self.is_finite() {
            return Err(StreamError::UnboundedStream);
        }
        let collector = Arc::new(Collector::default());
        let mut plan = Plan::new();
        self.wire(collector.clone(), &mut plan);
        plan.run_cold();
        debug_assert!(collector.completed.load(Ordering::Acquire));

        let items = collector.take();
        if items.is_empty() {
            Ok(default)
        } else {
            Ok(items)
        }
    }

    pub(crate) fn wire(&self, down: SinkRef<T>, plan: &mut Plan) {
        self.node.wire(down, plan);
    }
}

impl<I> Stream<I>
where
    I: Item + IntoIterator,
    I::Item: Item,
{
    /// Emits each element of each upstream collection individually.
    pub fn flatten_iterable(&self) -> Stream<I::Item> {
        Stream::from_node(FlattenNode { up: self.clone() })
    }
}

struct Collector<T> {
    items: Mutex<Vec<T>>,
    completed: AtomicBool,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            completed: AtomicBool::new(false),
        }
    }
}

impl<T> Collector<T> {
    fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<T: Item> Sink<T> for Collector<T> {
    fn on_next(&self, value: T) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    fn on_complete(&self) {
        self.completed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::DelayPolicy;

    fn multiset(values: &[i32]) -> HashMap<i32, usize> {
        let mut m = HashMap::new();
        for v in values {
            *m.entry(*v).or_default() += 1;
        }
        m
    }

    #[test]
    fn collect_returns_values_or_default() {
        let s = Stream::just([4, 2, 9]);
        assert_eq!(s.collect_blocking(vec![-1]).unwrap(), vec![4, 2, 9]);

        let empty = Stream::<i32>::empty();
        assert_eq!(empty.collect_blocking(vec![-1]).unwrap(), vec![-1]);
        assert!(empty.collect_blocking(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn finite_stream_replays_identically() {
        let s = Stream::just([1, 3, 5]).merge(&Stream::just([2, 4]));
        let first = s.collect_blocking(Vec::new()).unwrap();
        let second = s.collect_blocking(Vec::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn merge_keeps_registration_order_for_finite_sources() {
        let all = Stream::just([0])
            .merge(&Stream::just([1, 3, 5, 7]))
            .merge(&Stream::just([2, 4, 6, 8]));
        assert_eq!(
            all.collect_blocking(Vec::new()).unwrap(),
            vec![0, 1, 3, 5, 7, 2, 4, 6, 8]
        );
    }

    #[test]
    fn merge_is_commutative_on_multisets() {
        let a = Stream::just([1, 1, 2]);
        let b = Stream::just([2, 3]);
        let ab = a.merge(&b).collect_blocking(Vec::new()).unwrap();
        let ba = b.merge(&a).collect_blocking(Vec::new()).unwrap();
        assert_eq!(multiset(&ab), multiset(&ba));
        assert_eq!(multiset(&ab), multiset(&[1, 1, 2, 2, 3]));
    }

    #[test]
    fn buffer_then_flatten_reproduces_source() {
        let source: Vec<i32> = (0..23).collect();
        let s = Stream::just(source.clone());
        for n in [1, 2, 5, 7, 23, 40] {
            let round = s.buffer(n).unwrap().flatten_iterable();
            assert_eq!(round.collect_blocking(Vec::new()).unwrap(), source, "n={n}");
        }
    }

    #[test]
    fn identity_map_is_a_no_op() {
        let s = Stream::just([5, 1, 4]);
        assert_eq!(
            s.map(|v| v).collect_blocking(Vec::new()).unwrap(),
            vec![5, 1, 4]
        );
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = Stream::just([1]).buffer(0).err().unwrap();
        assert_eq!(err, StreamError::InvalidBatchSize { size: 0 });
    }

    #[test]
    fn unbounded_stream_cannot_be_collected() {
        let counter = Emitter::counter(1, 1, 3, DelayPolicy::None).unwrap();
        let s = Stream::just([0]).merge(&Stream::from(counter));
        assert!(!s.is_finite());
        assert_eq!(
            s.map(|v| v + 1).collect_blocking(Vec::new()),
            Err(StreamError::UnboundedStream)
        );
    }

    #[test]
    fn sorted_batch_restores_order() {
        let shuffled = Stream::just([0]).merge(&Stream::just([7, 2, 5, 8, 1, 4, 3, 6]));
        let sorted = shuffled
            .buffer(9)
            .unwrap()
            .map(|mut batch| {
                batch.sort_unstable();
                batch
            })
            .flatten_iterable();
        assert_eq!(
            sorted.collect_blocking(Vec::new()).unwrap(),
            (0..=8).collect::<Vec<_>>()
        );
    }

    #[test]
    fn to_list_yields_single_batch() {
        let s = Stream::just([3, 1]).to_list();
        assert_eq!(s.collect_blocking(Vec::new()).unwrap(), vec![vec![3, 1]]);
    }
}
