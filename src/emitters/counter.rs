//! # Counter producer.
//!
//! Emits `start, start + step, start + 2*step, ...` while the value is `<= bound`,
//! sleeping per its [`DelayPolicy`] before each emission, then completes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::emitters::{Emit, Produce};
use crate::error::StreamError;
use crate::policies::DelayPolicy;

/// Arithmetic progression producer.
#[derive(Clone, Debug)]
pub struct Counter {
    name: String,
    start: i64,
    step: i64,
    bound: i64,
    delay: DelayPolicy,
}

impl Counter {
    /// Creates a counter.
    ///
    /// # Errors
    /// [`StreamError::InvalidStep`] if `step <= 0`.
    pub fn new(start: i64, step: i64, bound: i64, delay: DelayPolicy) -> Result<Self, StreamError> {
        if step <= 0 {
            return Err(StreamError::InvalidStep { step });
        }
        Ok(Self {
            name: format!("counter[{start}..={bound} step {step}]"),
            start,
            step,
            bound,
            delay,
        })
    }

    /// Number of values one run emits, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        if self.start > self.bound {
            return 0;
        }
        let span = i128::from(self.bound) - i128::from(self.start);
        u64::try_from(span / i128::from(self.step) + 1).unwrap_or(u64::MAX)
    }

    /// True if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delay policy applied before each emission.
    pub fn delay(&self) -> DelayPolicy {
        self.delay
    }
}

#[async_trait]
impl Produce<i64> for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, out: Emit<i64>, ctx: CancellationToken) -> Result<(), StreamError> {
        let mut sampler = self.delay.sampler();
        let mut count = self.start;

        while count <= self.bound {
            let delay = sampler.next();
            if delay > Duration::ZERO {
                select! {
                    _ = time::sleep(delay) => {}
                    _ = ctx.cancelled() => return Err(StreamError::Canceled),
                }
            } else if ctx.is_cancelled() {
                return Err(StreamError::Canceled);
            }

            out.emit(count)?;
            match count.checked_add(self.step) {
                Some(next) => count = next,
                None => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::Bus;
    use crate::stream::sink::testing::Recorder;

    #[test]
    fn len_counts_inclusive_range() {
        let odds = Counter::new(1, 2, 7, DelayPolicy::None).unwrap();
        assert_eq!(odds.len(), 4);
        assert_eq!(Counter::new(2, 2, 9, DelayPolicy::None).unwrap().len(), 4);
        assert!(Counter::new(5, 1, 4, DelayPolicy::None).unwrap().is_empty());
        assert_eq!(
            Counter::new(0, 0, 4, DelayPolicy::None).unwrap_err(),
            StreamError::InvalidStep { step: 0 }
        );
    }

    #[test]
    fn len_saturates_on_full_range() {
        let full = Counter::new(i64::MIN, 1, i64::MAX, DelayPolicy::None).unwrap();
        assert_eq!(full.len(), u64::MAX);
        assert!(!full.is_empty());

        let halves = Counter::new(i64::MIN, 2, i64::MAX, DelayPolicy::None).unwrap();
        assert_eq!(halves.len(), 1 << 63);
    }

    #[tokio::test(start_paused = true)]
    async fn produces_progression_with_delays() {
        let counter = Counter::new(1, 2, 7, DelayPolicy::Fixed(Duration::from_millis(10))).unwrap();
        let rec = Arc::new(Recorder::<i64>::default());
        let out = Emit::<i64>::new(counter.name().into(), rec.clone(), Bus::new(16));

        let started = time::Instant::now();
        counter.produce(out, CancellationToken::new()).await.unwrap();

        assert_eq!(rec.values(), vec![1, 3, 5, 7]);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn stops_at_i64_max_without_overflow() {
        let counter = Counter::new(i64::MAX - 1, 1, i64::MAX, DelayPolicy::None).unwrap();
        let rec = Arc::new(Recorder::<i64>::default());
        let out = Emit::<i64>::new(counter.name().into(), rec.clone(), Bus::new(16));

        counter.produce(out, CancellationToken::new()).await.unwrap();
        assert_eq!(rec.values(), vec![i64::MAX - 1, i64::MAX]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_delay() {
        let counter = Counter::new(1, 1, 10, DelayPolicy::Fixed(Duration::from_secs(60))).unwrap();
        let rec = Arc::new(Recorder::<i64>::default());
        let out = Emit::<i64>::new(counter.name().into(), rec.clone(), Bus::new(16));
        let ctx = CancellationToken::new();
        ctx.cancel();

        let res = counter.produce(out, ctx).await;
        assert_eq!(res, Err(StreamError::Canceled));
        assert!(rec.values().is_empty());
    }
}
