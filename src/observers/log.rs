//! # LogWriter: simple event printer
//!
//! A minimal observer that prints incoming [`Event`]s to stdout, one line each.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [connected] producers=2
//! [emitter-starting] emitter="counter[1..=7 step 2]"
//! [emitted] emitter="counter[1..=7 step 2]" count=1
//! [emitter-completed] emitter="counter[1..=7 step 2]" total=4
//! [emitter-failed] emitter="sensor" err="disconnected" after=3
//! [subscription-completed] id=1 delivered=9
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn text(v: Option<&str>) -> &str {
    v.unwrap_or("unknown")
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let emitter = text(e.emitter.as_deref());
        let count = e.count.unwrap_or(0);
        let id = e.subscription.unwrap_or(0);

        match e.kind {
            EventKind::EmitterStarting => println!("[emitter-starting] emitter={emitter:?}"),
            EventKind::ValueEmitted => println!("[emitted] emitter={emitter:?} count={count}"),
            EventKind::EmitterCompleted => {
                println!("[emitter-completed] emitter={emitter:?} total={count}")
            }
            EventKind::EmitterFailed => println!(
                "[emitter-failed] emitter={emitter:?} err={:?} after={count}",
                text(e.reason.as_deref())
            ),
            EventKind::EmitterStopped => {
                println!("[emitter-stopped] emitter={emitter:?} after={count}")
            }
            EventKind::StreamConnected => println!(
                "[connected] producers={count} emitters={:?}",
                text(e.reason.as_deref())
            ),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace] grace_ms={:?}", e.bound_ms)
            }
            EventKind::GraceExceeded => println!(
                "[grace-exceeded] grace_ms={:?} stuck={}",
                e.bound_ms,
                text(e.reason.as_deref())
            ),
            EventKind::Subscribed => println!("[subscribed] id={id}"),
            EventKind::Unsubscribed => println!("[unsubscribed] id={id} delivered={count}"),
            EventKind::SubscriptionCompleted => {
                println!("[subscription-completed] id={id} delivered={count}")
            }
            EventKind::CallbackPanicked => println!(
                "[callback-panicked] id={id} info={}",
                text(e.reason.as_deref())
            ),
            EventKind::ObserverOverflow => println!(
                "[observer-overflow] observer={emitter} reason={}",
                text(e.reason.as_deref())
            ),
            EventKind::ObserverPanicked => println!(
                "[observer-panicked] observer={emitter} info={}",
                text(e.reason.as_deref())
            ),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
