use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::Config, runtime::Runtime};
use crate::{
    events::Bus,
    observers::{Observe, ObserverSet},
};

/// Builder for constructing a [`Runtime`].
pub struct RuntimeBuilder {
    cfg: Config,
    observers: Vec<Arc<dyn Observe>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
        }
    }

    /// Sets event observers (logging, metrics).
    ///
    /// Observers receive runtime events through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Adds one observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds the runtime and starts its observer listener.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Runtime> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let observers = Arc::new(ObserverSet::new(self.observers, bus.clone()));
        let token = CancellationToken::new();

        let rt = Arc::new(Runtime::new_internal(self.cfg, bus, observers, token));
        rt.observer_listener();
        rt
    }
}
