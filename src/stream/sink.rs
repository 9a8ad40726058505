//! Internal push contract between operators, and the launch plan produced by wiring.

use std::sync::Arc;

use crate::core::{Launched, Launcher};

/// Receives values pushed by an upstream stage.
///
/// Implementations must tolerate concurrent calls from several producer tasks.
pub(crate) trait Sink<T>: Send + Sync {
    fn on_next(&self, value: T);
    fn on_complete(&self);
}

pub(crate) type SinkRef<T> = Arc<dyn Sink<T>>;

/// One stage of an operator chain.
pub(crate) trait Node<T>: Send + Sync {
    /// Connects this stage (and everything upstream) to `down`, recording the
    /// source launches into `plan`.
    fn wire(&self, down: SinkRef<T>, plan: &mut Plan);

    /// True if every source under this stage is finite.
    fn is_finite(&self) -> bool;
}

type ColdLaunch = Box<dyn FnOnce() + Send>;
type HotLaunch = Box<dyn FnOnce(&Launcher) -> Launched + Send>;

/// Source launches collected while wiring, in registration order.
#[derive(Default)]
pub(crate) struct Plan {
    cold: Vec<ColdLaunch>,
    hot: Vec<HotLaunch>,
}

impl Plan {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_cold(&mut self, launch: ColdLaunch) {
        self.cold.push(launch);
    }

    pub(crate) fn push_hot(&mut self, launch: HotLaunch) {
        self.hot.push(launch);
    }

    /// Number of unbounded producers in the plan.
    pub(crate) fn hot_len(&self) -> usize {
        self.hot.len()
    }

    /// Drains every finite source synchronously.
    pub(crate) fn run_cold(&mut self) {
        for launch in self.cold.drain(..) {
            launch();
        }
    }

    /// Spawns one producer per unbounded source.
    pub(crate) fn launch_hot(self, launcher: &Launcher) -> Vec<Launched> {
        self.hot.into_iter().map(|launch| launch(launcher)).collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::Sink;

    /// Sink that records everything it receives.
    #[derive(Default)]
    pub(crate) struct Recorder<T> {
        pub(crate) values: Mutex<Vec<T>>,
        pub(crate) completions: AtomicUsize,
    }

    impl<T: Clone> Recorder<T> {
        pub(crate) fn values(&self) -> Vec<T> {
            self.values.lock().unwrap().clone()
        }

        pub(crate) fn completions(&self) -> usize {
            self.completions.load(Ordering::SeqCst)
        }
    }

    impl<T: Send> Sink<T> for Recorder<T> {
        fn on_next(&self, value: T) {
            self.values.lock().unwrap().push(value);
        }

        fn on_complete(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }
}
