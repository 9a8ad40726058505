//! # Delay policy for unbounded emitters.
//!
//! [`DelayPolicy`] decides how long a producer sleeps before each emission.
//! Randomness is owned by the [`DelaySampler`] of a single producer run, never by
//! process-wide state, so a seeded policy yields the same delays every time.
//!
//! - [`DelayPolicy::None`]: no delay
//! - [`DelayPolicy::Fixed`]: the same delay before every emission
//! - [`DelayPolicy::Uniform`]: random delay in `[0, bound)` with millisecond resolution

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Policy controlling the pause before each emission.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use rxflow::DelayPolicy;
///
/// let policy = DelayPolicy::seeded(Duration::from_millis(50), 7);
/// let a: Vec<_> = { let mut s = policy.sampler(); (0..4).map(|_| s.next()).collect() };
/// let b: Vec<_> = { let mut s = policy.sampler(); (0..4).map(|_| s.next()).collect() };
/// assert_eq!(a, b);
/// assert!(a.iter().all(|d| *d < Duration::from_millis(50)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DelayPolicy {
    /// Emit without waiting.
    #[default]
    None,

    /// Wait exactly this long before every emission.
    Fixed(Duration),

    /// Wait a uniformly random duration in `[0, bound)`.
    ///
    /// With `seed: Some(_)` the sequence of delays is reproducible.
    Uniform {
        /// Exclusive upper bound.
        bound: Duration,
        /// Optional seed for the sampler's generator.
        seed: Option<u64>,
    },
}

impl DelayPolicy {
    /// Uniform random delay below `bound`, seeded from the thread RNG.
    pub fn uniform(bound: Duration) -> Self {
        DelayPolicy::Uniform { bound, seed: None }
    }

    /// Uniform random delay below `bound` with a fixed seed.
    pub fn seeded(bound: Duration, seed: u64) -> Self {
        DelayPolicy::Uniform {
            bound,
            seed: Some(seed),
        }
    }

    /// Creates a fresh sampler for one producer run.
    pub fn sampler(&self) -> DelaySampler {
        let rng = match self {
            DelayPolicy::Uniform { seed: Some(s), .. } => StdRng::seed_from_u64(*s),
            _ => StdRng::from_rng(&mut rand::rng()),
        };
        DelaySampler { policy: *self, rng }
    }

    /// Upper bound of a single delay (inclusive for `Fixed`, exclusive for `Uniform`).
    pub fn max_delay(&self) -> Duration {
        match self {
            DelayPolicy::None => Duration::ZERO,
            DelayPolicy::Fixed(d) => *d,
            DelayPolicy::Uniform { bound, .. } => *bound,
        }
    }

    /// Time sufficient to observe `emissions` values from one producer:
    /// `max_delay × emissions`.
    pub fn settle_bound(&self, emissions: u32) -> Duration {
        self.max_delay().saturating_mul(emissions)
    }
}

/// Stateful delay generator for a single producer run.
#[derive(Debug)]
pub struct DelaySampler {
    policy: DelayPolicy,
    rng: StdRng,
}

impl DelaySampler {
    /// Returns the delay to wait before the next emission.
    pub fn next(&mut self) -> Duration {
        match self.policy {
            DelayPolicy::None => Duration::ZERO,
            DelayPolicy::Fixed(d) => d,
            DelayPolicy::Uniform { bound, .. } => {
                let ms = bound.as_millis().min(u128::from(u64::MAX)) as u64;
                if ms == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(self.rng.random_range(0..ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_waits() {
        let mut s = DelayPolicy::None.sampler();
        assert_eq!(s.next(), Duration::ZERO);
        assert_eq!(DelayPolicy::None.settle_bound(100), Duration::ZERO);
    }

    #[test]
    fn fixed_is_constant() {
        let policy = DelayPolicy::Fixed(Duration::from_millis(3));
        let mut s = policy.sampler();
        for _ in 0..5 {
            assert_eq!(s.next(), Duration::from_millis(3));
        }
        assert_eq!(policy.settle_bound(4), Duration::from_millis(12));
    }

    #[test]
    fn uniform_stays_below_bound() {
        let bound = Duration::from_millis(10);
        let mut s = DelayPolicy::uniform(bound).sampler();
        for _ in 0..1000 {
            assert!(s.next() < bound);
        }
    }

    #[test]
    fn uniform_zero_bound_is_zero() {
        let mut s = DelayPolicy::uniform(Duration::ZERO).sampler();
        assert_eq!(s.next(), Duration::ZERO);
    }

    #[test]
    fn seeded_is_reproducible() {
        let policy = DelayPolicy::seeded(Duration::from_millis(1000), 42);
        let mut a = policy.sampler();
        let mut b = policy.sampler();
        for _ in 0..32 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn settle_bound_uses_max_delay() {
        let policy = DelayPolicy::uniform(Duration::from_millis(1000));
        assert_eq!(policy.settle_bound(4), Duration::from_secs(4));
    }
}
