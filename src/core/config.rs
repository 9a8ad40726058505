//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the stream runtime.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `grace = 0s` → shutdown does not wait; any producer still running is reported as stuck

use std::time::Duration;

/// Global configuration for the stream runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `grace`: Maximum wait for producers to stop after cancellation
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging behind more than `bus_capacity` events skip the oldest.
    pub bus_capacity: usize,

    /// Maximum time to wait for producers to stop after a connection is shut down.
    ///
    /// Exceeding it yields `RuntimeError::GraceExceeded`.
    pub grace: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}
