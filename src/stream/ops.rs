//! Operator stages and their sinks.
//!
//! Every stage owns its upstream [`Stream`] and, when wired, wraps the
//! downstream sink in its own sink. Stages hold no runtime state; all state
//! (pending batches, merge counters) lives in the sinks created per wiring, so
//! one stream can be consumed any number of times.

use std::marker::PhantomData;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::Launcher;
use crate::emitters::Emitter;

use super::Item;
use super::pipeline::Stream;
use super::sink::{Node, Plan, Sink, SinkRef};

// ---- Source ----

pub(super) struct SourceNode<T: Item> {
    pub(super) emitter: Emitter<T>,
}

impl<T: Item> Node<T> for SourceNode<T> {
    fn wire(&self, down: SinkRef<T>, plan: &mut Plan) {
        match &self.emitter {
            Emitter::Finite(values) => {
                let values = Arc::clone(values);
                plan.push_cold(Box::new(move || {
                    for v in values.iter() {
                        down.on_next(v.clone());
                    }
                    down.on_complete();
                }));
            }
            Emitter::Unbounded(producer) => {
                let producer = Arc::clone(producer);
                plan.push_hot(Box::new(move |launcher: &Launcher| {
                    launcher.spawn(producer, down)
                }));
            }
        }
    }

    fn is_finite(&self) -> bool {
        self.emitter.is_finite()
    }
}

// ---- Merge ----

pub(super) struct MergeNode<T: Item> {
    pub(super) inputs: Vec<Stream<T>>,
}

impl<T: Item> Node<T> for MergeNode<T> {
    fn wire(&self, down: SinkRef<T>, plan: &mut Plan) {
        if self.inputs.is_empty() {
            plan.push_cold(Box::new(move || down.on_complete()));
            return;
        }
        let gate = Arc::new(MergeGate {
            remaining: AtomicUsize::new(self.inputs.len()),
            down,
        });
        for input in &self.inputs {
            let sink = Arc::new(MergeInput {
                gate: Arc::clone(&gate),
                finished: AtomicBool::new(false),
            });
            input.wire(sink, plan);
        }
    }

    fn is_finite(&self) -> bool {
        self.inputs.iter().all(Stream::is_finite)
    }
}

/// Completes downstream once every input has completed.
struct MergeGate<T> {
    remaining: AtomicUsize,
    down: SinkRef<T>,
}

struct MergeInput<T> {
    gate: Arc<MergeGate<T>>,
    finished: AtomicBool,
}

impl<T: Item> Sink<T> for MergeInput<T> {
    fn on_next(&self, value: T) {
        self.gate.down.on_next(value);
    }

    fn on_complete(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        if self.gate.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.gate.down.on_complete();
        }
    }
}

// ---- Map / Filter ----

pub(super) struct MapNode<T: Item, U: Item> {
    pub(super) up: Stream<T>,
    pub(super) f: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T: Item, U: Item> Node<U> for MapNode<T, U> {
    fn wire(&self, down: SinkRef<U>, plan: &mut Plan) {
        let sink = Arc::new(MapSink {
            f: Arc::clone(&self.f),
            down,
        });
        self.up.wire(sink, plan);
    }

    fn is_finite(&self) -> bool {
        self.up.is_finite()
    }
}

struct MapSink<T, U> {
    f: Arc<dyn Fn(T) -> U + Send + Sync>,
    down: SinkRef<U>,
}

impl<T: Item, U: Item> Sink<T> for MapSink<T, U> {
    fn on_next(&self, value: T) {
        self.down.on_next((self.f)(value));
    }

    fn on_complete(&self) {
        self.down.on_complete();
    }
}

pub(super) struct FilterNode<T: Item> {
    pub(super) up: Stream<T>,
    pub(super) pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: Item> Node<T> for FilterNode<T> {
    fn wire(&self, down: SinkRef<T>, plan: &mut Plan) {
        let sink = Arc::new(FilterSink {
            pred: Arc::clone(&self.pred),
            down,
        });
        self.up.wire(sink, plan);
    }

    fn is_finite(&self) -> bool {
        self.up.is_finite()
    }
}

struct FilterSink<T> {
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    down: SinkRef<T>,
}

impl<T: Item> Sink<T> for FilterSink<T> {
    fn on_next(&self, value: T) {
        if (self.pred)(&value) {
            self.down.on_next(value);
        }
    }

    fn on_complete(&self) {
        self.down.on_complete();
    }
}

// ---- Buffer / ToList ----

pub(super) struct BufferNode<T: Item> {
    pub(super) up: Stream<T>,
    /// `None` collects everything into one batch (`to_list`).
    pub(super) size: Option<usize>,
}

impl<T: Item> Node<Vec<T>> for BufferNode<T> {
    fn wire(&self, down: SinkRef<Vec<T>>, plan: &mut Plan) {
        let sink = Arc::new(BufferSink {
            size: self.size,
            pending: Mutex::new(Vec::with_capacity(self.size.unwrap_or(0))),
            down,
        });
        self.up.wire(sink, plan);
    }

    fn is_finite(&self) -> bool {
        self.up.is_finite()
    }
}

/// Groups consecutive values into batches.
///
/// The lock is held while a full batch is forwarded, so batches leave in the
/// order they were filled even with several producers pushing concurrently.
struct BufferSink<T> {
    size: Option<usize>,
    pending: Mutex<Vec<T>>,
    down: SinkRef<Vec<T>>,
}

impl<T: Item> Sink<T> for BufferSink<T> {
    fn on_next(&self, value: T) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.push(value);
        match self.size {
            Some(size) if pending.len() >= size => {
                let batch = mem::replace(&mut *pending, Vec::with_capacity(size));
                self.down.on_next(batch);
            }
            _ => {}
        }
    }

    fn on_complete(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let rest = mem::take(&mut *pending);
        // to_list always emits its single batch; buffer only flushes a partial one
        if self.size.is_none() || !rest.is_empty() {
            self.down.on_next(rest);
        }
        self.down.on_complete();
    }
}

// ---- Flatten ----

pub(super) struct FlattenNode<I: Item> {
    pub(super) up: Stream<I>,
}

impl<I> Node<I::Item> for FlattenNode<I>
where
    I: Item + IntoIterator,
    I::Item: Item,
{
    fn wire(&self, down: SinkRef<I::Item>, plan: &mut Plan) {
        let sink = Arc::new(FlattenSink {
            down,
            _batch: PhantomData,
        });
        self.up.wire(sink, plan);
    }

    fn is_finite(&self) -> bool {
        self.up.is_finite()
    }
}

struct FlattenSink<I: IntoIterator> {
    down: SinkRef<I::Item>,
    _batch: PhantomData<fn(I)>,
}

impl<I> Sink<I> for FlattenSink<I>
where
    I: Item + IntoIterator,
    I::Item: Item,
{
    fn on_next(&self, batch: I) {
        for value in batch {
            self.down.on_next(value);
        }
    }

    fn on_complete(&self) {
        self.down.on_complete();
    }
}
