//! # EmitterActor: runs one unbounded producer.
//!
//! Drives a single [`Produce`] implementation on its own task, with
//! cooperative cancellation via [`CancellationToken`].
//!
//! ## Event flow
//! ```text
//! EmitterStarting → [produce] → EmitterCompleted (Ok)
//!                             → EmitterStopped   (Canceled / token cancelled)
//!                             → EmitterFailed    (error or panic)
//! ```
//! After the terminal event the actor completes its [`Emit`] handle, so the
//! input counts as finished downstream whatever the outcome.
//!
//! ## Architecture
//! ```text
//! connect() ──► Plan::launch_hot(&Launcher)
//!                   └─► Launcher::spawn(producer, sink)
//!                           ├─► Emit::new(name, sink, bus)
//!                           └─► tokio::spawn(EmitterActor::run(emit, child_token))
//! ```
//!
//! ## Rules
//! - Exactly **one** terminal event per run.
//! - The producer receives a **child token**; cancelling the connection cancels every producer.
//! - A panicking producer is reported as `EmitterFailed`, never propagated.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{select, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    emitters::{Emit, ProducerRef},
    error::StreamError,
    events::{Bus, Event, EventKind},
    stream::{Item, sink::SinkRef},
};

/// A spawned producer task and the emitter name it runs.
pub(crate) struct Launched {
    pub(crate) name: Arc<str>,
    /// `None` once the task has been joined.
    pub(crate) handle: Option<JoinHandle<()>>,
}

impl Launched {
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

/// `StreamConnected` event naming every spawned producer, in start order.
pub(crate) fn connected_event(producers: &[Launched]) -> Event {
    let names: Vec<&str> = producers.iter().map(|p| &*p.name).collect();
    Event::new(EventKind::StreamConnected)
        .with_count(producers.len() as u64)
        .with_reason(names.join(","))
}

/// Spawns producers for one connection.
pub(crate) struct Launcher {
    bus: Bus,
    token: CancellationToken,
}

impl Launcher {
    pub(crate) fn new(bus: Bus, token: CancellationToken) -> Self {
        Self { bus, token }
    }

    /// Spawns `producer` feeding `down` and returns its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn<T: Item>(&self, producer: ProducerRef<T>, down: SinkRef<T>) -> Launched {
        let name: Arc<str> = Arc::from(producer.name());
        let out = Emit::new(Arc::clone(&name), down, self.bus.clone());
        let actor = EmitterActor {
            producer,
            name: Arc::clone(&name),
            bus: self.bus.clone(),
        };
        let handle = tokio::spawn(actor.run(out, self.token.child_token()));
        Launched {
            name,
            handle: Some(handle),
        }
    }
}

/// Runs a single producer and reports its lifecycle on the bus.
struct EmitterActor<T: Item> {
    producer: ProducerRef<T>,
    name: Arc<str>,
    bus: Bus,
}

impl<T: Item> EmitterActor<T> {
    async fn run(self, out: Emit<T>, token: CancellationToken) {
        self.bus
            .publish(Event::new(EventKind::EmitterStarting).with_emitter(Arc::clone(&self.name)));

        let fut = AssertUnwindSafe(self.producer.produce(out.clone(), token.clone())).catch_unwind();
        let res = select! {
            res = fut => match res {
                Ok(res) => res,
                Err(panic) => Err(StreamError::Produce { error: panic_message(panic) }),
            },
            _ = token.cancelled() => Err(StreamError::Canceled),
        };

        let ev = match res {
            Ok(()) => Event::new(EventKind::EmitterCompleted),
            Err(StreamError::Canceled) => Event::new(EventKind::EmitterStopped),
            Err(e) => Event::new(EventKind::EmitterFailed).with_reason(e.to_string()),
        };
        self.bus.publish(
            ev.with_emitter(Arc::clone(&self.name))
                .with_count(out.emitted()),
        );
        out.complete();
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic: unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::emitters::ProduceFn;
    use crate::stream::sink::testing::Recorder;

    fn kinds(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev.kind);
        }
        out
    }

    #[tokio::test]
    async fn completes_sink_after_success() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::<i32>::default());
        let producer = ProduceFn::arc("two", |out: Emit<i32>, _ctx: CancellationToken| async move {
            out.emit(1)?;
            out.emit(2)?;
            Ok::<_, StreamError>(())
        });

        let launcher = Launcher::new(bus.clone(), CancellationToken::new());
        let launched = launcher.spawn::<i32>(producer, rec.clone());
        assert_eq!(&*launched.name, "two");
        launched.handle.unwrap().await.unwrap();

        assert_eq!(rec.values(), vec![1, 2]);
        assert_eq!(rec.completions(), 1);
        assert_eq!(
            kinds(&mut rx),
            vec![
                EventKind::EmitterStarting,
                EventKind::ValueEmitted,
                EventKind::ValueEmitted,
                EventKind::EmitterCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn failure_and_panic_are_reported_and_complete_the_input() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let launcher = Launcher::new(bus.clone(), CancellationToken::new());

        let failing = ProduceFn::arc("fail", |_out: Emit<i32>, _ctx: CancellationToken| async move {
            Err::<(), _>(StreamError::Produce {
                error: "boom".into(),
            })
        });
        let rec = Arc::new(Recorder::<i32>::default());
        launcher.spawn::<i32>(failing, rec.clone()).handle.unwrap().await.unwrap();
        assert_eq!(rec.completions(), 1);

        let panicking = ProduceFn::arc("panic", |out: Emit<i32>, _ctx: CancellationToken| async move {
            if out.emitted() == 0 {
                panic!("kaboom");
            }
            Ok::<_, StreamError>(())
        });
        let rec = Arc::new(Recorder::<i32>::default());
        launcher.spawn::<i32>(panicking, rec.clone()).handle.unwrap().await.unwrap();
        assert_eq!(rec.completions(), 1);

        let failed: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| e.kind == EventKind::EmitterFailed)
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed[0].reason.as_deref().unwrap().contains("boom"));
        assert!(failed[1].reason.as_deref().unwrap().contains("kaboom"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_a_sleeping_producer() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let rec = Arc::new(Recorder::<i32>::default());
        let sleepy = ProduceFn::arc("sleepy", |out: Emit<i32>, _ctx: CancellationToken| async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            out.emit(1)?;
            Ok::<_, StreamError>(())
        });

        let launched = Launcher::new(bus.clone(), token.clone()).spawn::<i32>(sleepy, rec.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        launched.handle.unwrap().await.unwrap();

        assert!(rec.values().is_empty());
        assert_eq!(rec.completions(), 1);
        assert_eq!(kinds(&mut rx).last(), Some(&EventKind::EmitterStopped));
    }
}
