//! # Runtime: event bus, observers, and the entry points for live consumption.
//!
//! The [`Runtime`] owns the event [`Bus`], the [`ObserverSet`] fed from it, and the
//! root [`CancellationToken`] every connection derives its token from.
//!
//! ## Event flow
//! ```text
//! EmitterActor / Emit / Delivery / Connection ── publish(Event) ──► Bus
//!                                                                    │
//!                                                     observer listener (one task)
//!                                                                    ▼
//!                                                       ObserverSet::emit(&Event)
//!                                                     ┌──────────┬──────────┐
//!                                                     ▼          ▼          ▼
//!                                                [queue O1] [queue O2] ... [queue ON]
//! ```
//!
//! ## Subscribing
//! - Finite stream: [`Runtime::subscribe`] delivers every value and the completion
//!   before returning.
//! - Stream with unbounded sources: the stream is published, the callback attached and
//!   the stream connected on the caller's behalf; producers run detached.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use rxflow::{Config, DelayPolicy, Emitter, Runtime, Stream};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let rt = Runtime::builder(Config::default()).build();
//!
//!     let odds = Emitter::counter(1, 2, 7, DelayPolicy::uniform(Duration::from_millis(5))).unwrap();
//!     let evens = Emitter::counter(2, 2, 8, DelayPolicy::uniform(Duration::from_millis(5))).unwrap();
//!     let stream = Stream::merge_all([Stream::from(odds), Stream::from(evens), Stream::just([0])]);
//!
//!     let hot = rt.publish(&stream);
//!     let sub = hot.subscribe(|v: i64| println!("{v}"));
//!     let mut conn = hot.connect().unwrap();
//!     conn.join().await;
//!     assert_eq!(sub.delivered(), 9);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use super::{Launcher, actor::connected_event, builder::RuntimeBuilder, config::Config, connectable::ConnectableStream};
use crate::{
    events::{Bus, Event, EventKind},
    observers::ObserverSet,
    stream::{Item, Stream, sink::Plan},
    subscription::{Delivery, Subscription},
};

/// Owns the event bus and observers; publishes and subscribes to streams.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    observers: Arc<ObserverSet>,
    token: CancellationToken,
}

impl Runtime {
    /// Returns a builder for a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        observers: Arc<ObserverSet>,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            observers,
            token,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Subscribes to runtime events.
    ///
    /// Events published before this call are not replayed.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Turns `stream` into a connectable stream whose sources start on `connect`.
    pub fn publish<T: Item>(&self, stream: &Stream<T>) -> ConnectableStream<T> {
        ConnectableStream::new(stream.clone(), self.bus.clone(), self.token.clone(), self.cfg.grace)
    }

    /// Registers a value callback on `stream`.
    ///
    /// Must be called from within a tokio runtime if `stream` has unbounded sources.
    pub fn subscribe<T: Item>(&self, stream: &Stream<T>, on_value: impl FnMut(T) + Send + 'static) -> Subscription {
        self.attach(stream, Delivery::new(self.bus.clone(), Box::new(on_value), None))
    }

    /// Registers a value callback and a completion callback on `stream`.
    pub fn subscribe_with<T: Item>(
        &self,
        stream: &Stream<T>,
        on_value: impl FnMut(T) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Subscription {
        self.attach(
            stream,
            Delivery::new(self.bus.clone(), Box::new(on_value), Some(Box::new(on_complete))),
        )
    }

    fn attach<T: Item>(&self, stream: &Stream<T>, delivery: Arc<Delivery<T>>) -> Subscription {
        let handle = delivery.handle();
        let mut plan = Plan::new();
        stream.wire(delivery, &mut plan);
        plan.run_cold();
        if plan.hot_len() > 0 {
            // producers run detached until they finish or the runtime shuts down;
            // StreamConnected records which ones
            let producers = plan.launch_hot(&Launcher::new(self.bus.clone(), self.token.child_token()));
            self.bus.publish(connected_event(&producers));
        }
        handle
    }

    /// Cancels every connection made through this runtime.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
            self.token.cancel();
        }
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Forwards bus events to the observer set (fire-and-forget).
    pub(super) fn observer_listener(&self) {
        if self.observers.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.observers);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::emitters::{Emit, Emitter, ProduceFn};
    use crate::error::{RuntimeError, StreamError};
    use crate::observers::Observe;
    use crate::policies::DelayPolicy;

    const MAX_DELAY: Duration = Duration::from_millis(1000);

    fn runtime() -> Arc<Runtime> {
        Runtime::builder(Config::default()).build()
    }

    fn odds_and_evens(odds_seed: u64, evens_seed: u64) -> Stream<i64> {
        let odds = Emitter::counter(1, 2, 7, DelayPolicy::seeded(MAX_DELAY, odds_seed)).unwrap();
        let evens = Emitter::counter(2, 2, 8, DelayPolicy::seeded(MAX_DELAY, evens_seed)).unwrap();
        Stream::merge_all([Stream::from(odds), Stream::from(evens), Stream::just([0])])
    }

    fn recording<T: Item>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: T| sink.lock().unwrap().push(v))
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn finite_subscribe_matches_blocking_collect() {
        let rt = runtime();
        let stream = Stream::merge_all([Stream::just([0]), Stream::just([1, 3, 5, 7]), Stream::just([2, 4, 6, 8])]);

        let (seen, cb) = recording::<i32>();
        let sub = rt.subscribe(&stream, cb);

        assert!(sub.is_completed());
        assert_eq!(sub.delivered(), 9);
        assert_eq!(*seen.lock().unwrap(), stream.collect_blocking(Vec::new()).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn hot_merge_delivers_every_value_once_within_settle_bound() {
        let rt = runtime();
        let hot = rt.publish(&odds_and_evens(7, 11));
        let (seen, cb) = recording::<i64>();
        let sub = hot.subscribe(cb);

        let mut conn = hot.connect().unwrap();
        // the finite input is delivered synchronously on connect
        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert_eq!(conn.emitters().len(), 2);

        conn.wait(DelayPolicy::uniform(MAX_DELAY).settle_bound(4)).await.unwrap();
        sub.done().await;

        let mut values = seen.lock().unwrap().clone();
        values.sort_unstable();
        assert_eq!(values, (0..=8).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn sorted_push_emits_exact_sequence() {
        let rt = runtime();
        let stream = odds_and_evens(3, 5)
            .buffer(9)
            .unwrap()
            .map(|mut batch: Vec<i64>| {
                batch.sort_unstable();
                batch
            })
            .flatten_iterable();

        let (seen, cb) = recording::<i64>();
        let hot = rt.publish(&stream);
        let sub = hot.subscribe(cb);
        let mut conn = hot.connect().unwrap();
        conn.join().await;

        assert!(sub.is_completed());
        assert_eq!(*seen.lock().unwrap(), (0..=8).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_sees_no_replay() {
        let rt = runtime();
        let counter = Emitter::counter(1, 1, 4, DelayPolicy::Fixed(Duration::from_secs(1))).unwrap();
        let hot = rt.publish(&Stream::from(counter));
        let (early, cb) = recording::<i64>();
        hot.subscribe(cb);
        let mut conn = hot.connect().unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let (late, cb) = recording::<i64>();
        let late_sub = hot.subscribe(cb);
        conn.join().await;

        assert_eq!(*early.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(*late.lock().unwrap(), vec![3, 4]);
        assert!(late_sub.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_on_hot_stream_connects_implicitly() {
        let rt = runtime();
        let counter = Emitter::counter(1, 1, 3, DelayPolicy::Fixed(Duration::from_millis(100))).unwrap();
        let completed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&completed);

        let (seen, cb) = recording::<i64>();
        let sub = rt.subscribe_with(&Stream::from(counter), cb, move || flag.store(true, Ordering::SeqCst));
        assert!(seen.lock().unwrap().is_empty());

        sub.done().await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert!(completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn implicit_connect_names_detached_producers() {
        let rt = runtime();
        let mut rx = rt.events();
        let sub = rt.subscribe(&odds_and_evens(1, 2), |_v: i64| {});

        let connected = drain(&mut rx)
            .into_iter()
            .find(|e| e.kind == EventKind::StreamConnected)
            .unwrap();
        assert_eq!(connected.count, Some(2));
        assert_eq!(
            connected.reason.as_deref(),
            Some("counter[1..=7 step 2],counter[2..=8 step 2]")
        );

        sub.done().await;
        assert_eq!(sub.delivered(), 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_never_overlap_a_callback() {
        const PRODUCERS: i64 = 4;
        const PER_PRODUCER: i64 = 2000;

        let rt = runtime();
        let inputs = (0..PRODUCERS).map(|p| {
            let producer = ProduceFn::arc(format!("burst-{p}"), move |out: Emit<i64>, _ctx: CancellationToken| async move {
                for i in 0..PER_PRODUCER {
                    out.emit(p * PER_PRODUCER + i)?;
                    if i % 64 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
                Ok::<_, StreamError>(())
            });
            Stream::from(Emitter::<i64>::unbounded(producer))
        });
        let hot = rt.publish(&Stream::merge_all(inputs));

        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (flag, clashes, count) = (Arc::clone(&busy), Arc::clone(&overlaps), Arc::clone(&calls));
        let sub = hot.subscribe(move |_v: i64| {
            if flag.swap(true, Ordering::SeqCst) {
                clashes.fetch_add(1, Ordering::SeqCst);
            }
            count.fetch_add(1, Ordering::SeqCst);
            std::hint::spin_loop();
            flag.store(false, Ordering::SeqCst);
        });

        let mut conn = hot.connect().unwrap();
        conn.join().await;
        sub.done().await;

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), (PRODUCERS * PER_PRODUCER) as usize);
        assert_eq!(sub.delivered(), (PRODUCERS * PER_PRODUCER) as u64);
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_before_first_emission_receives_nothing() {
        let rt = runtime();
        let counter = Emitter::counter(1, 1, 3, DelayPolicy::Fixed(Duration::from_millis(100))).unwrap();
        let (seen, cb) = recording::<i64>();
        let sub = rt.subscribe(&Stream::from(counter), cb);
        sub.unsubscribe();
        sub.unsubscribe();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(sub.delivered(), 0);
        assert!(!sub.is_active());
    }

    #[tokio::test]
    async fn failed_producer_completes_its_input() {
        let rt = runtime();
        let mut rx = rt.events();
        let failing = ProduceFn::arc("flaky", |out: Emit<i64>, _ctx: CancellationToken| async move {
            out.emit(10)?;
            Err::<(), _>(StreamError::Produce {
                error: "disk on fire".into(),
            })
        });
        let stream = Stream::from(Emitter::<i64>::unbounded(failing)).merge(&Stream::just([1]));

        let hot = rt.publish(&stream);
        let (seen, cb) = recording::<i64>();
        let sub = hot.subscribe(cb);
        let mut conn = hot.connect().unwrap();
        conn.join().await;

        assert!(sub.is_completed());
        assert_eq!(*seen.lock().unwrap(), vec![1, 10]);
        let failed = drain(&mut rx)
            .into_iter()
            .find(|e| e.kind == EventKind::EmitterFailed)
            .unwrap();
        assert_eq!(failed.emitter.as_deref(), Some("flaky"));
        assert!(failed.reason.as_deref().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_delivery() {
        let rt = runtime();
        let mut rx = rt.events();
        let (seen, mut cb) = recording::<i32>();
        let sub = rt.subscribe(&Stream::just([1, 2, 3]), move |v: i32| {
            if v == 2 {
                panic!("bad value");
            }
            cb(v);
        });

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
        assert_eq!(sub.delivered(), 2);
        assert!(drain(&mut rx).iter().any(|e| e.kind == EventKind::CallbackPanicked));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_bound_exceeded_names_the_emitter() {
        let rt = runtime();
        let counter = Emitter::counter(1, 1, 3, DelayPolicy::Fixed(Duration::from_secs(1))).unwrap();
        let hot = rt.publish(&Stream::from(counter));
        let _sub = hot.subscribe(|_v: i64| {});
        let mut conn = hot.connect().unwrap();

        match conn.wait(Duration::from_millis(500)).await {
            Err(RuntimeError::WaitExceeded { pending, .. }) => {
                assert_eq!(pending, vec!["counter[1..=3 step 1]".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(conn.wait(Duration::from_secs(3)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_shutdown_stops_producers() {
        let rt = runtime();
        let mut rx = rt.events();
        let counter = Emitter::counter(1, 1, 100, DelayPolicy::Fixed(Duration::from_secs(1))).unwrap();
        let hot = rt.publish(&Stream::from(counter));
        let (seen, cb) = recording::<i64>();
        let sub = hot.subscribe(cb);
        let mut conn = hot.connect().unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        rt.shutdown();
        assert!(rt.is_shut_down());
        conn.join().await;

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(sub.is_completed());
        let kinds: Vec<EventKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert!(kinds.contains(&EventKind::EmitterStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn connection_shutdown_reports_all_stopped() {
        let rt = runtime();
        let mut rx = rt.events();
        let counter = Emitter::counter(1, 1, 100, DelayPolicy::Fixed(Duration::from_secs(1))).unwrap();
        let hot = rt.publish(&Stream::from(counter));
        let sub = hot.subscribe(|_v: i64| {});
        let mut conn = hot.connect().unwrap();

        conn.shutdown().await.unwrap();
        assert!(conn.is_finished());
        assert!(sub.is_completed());
        assert!(!rt.is_shut_down());
        let last = drain(&mut rx).pop().unwrap();
        assert_eq!(last.kind, EventKind::AllStoppedWithin);
    }

    struct Kinds(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Observe for Kinds {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[tokio::test]
    async fn observers_receive_runtime_events() {
        let kinds = Arc::new(Kinds(Mutex::new(Vec::new())));
        let rt = Runtime::builder(Config::default())
            .with_observer(kinds.clone() as Arc<dyn Observe>)
            .build();

        let sub = rt.subscribe(&Stream::just([1, 2]), |_v: i32| {});
        assert!(sub.is_completed());

        for _ in 0..50 {
            if kinds.0.lock().unwrap().contains(&EventKind::SubscriptionCompleted) {
                break;
            }
            tokio::task::yield_now().await;
        }
        let seen = kinds.0.lock().unwrap().clone();
        assert_eq!(seen.first(), Some(&EventKind::Subscribed));
        assert!(seen.contains(&EventKind::SubscriptionCompleted));
    }
}
