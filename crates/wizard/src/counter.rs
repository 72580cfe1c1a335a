//! "Opportunities found" counter. Purely cosmetic: it climbs by a small
//! random amount on a fixed interval and is never persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug)]
pub struct OpportunityCounter {
    value: AtomicU64,
    max_increment: u64,
}

impl OpportunityCounter {
    pub fn new(start: u64, max_increment: u64) -> Self {
        Self {
            value: AtomicU64::new(start),
            max_increment: max_increment.max(1),
        }
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Adds a random increment in `1..=max_increment` and returns the new value.
    pub fn tick<R: Rng>(&self, rng: &mut R) -> u64 {
        let step = rng.gen_range(1..=self.max_increment);
        self.value.fetch_add(step, Ordering::Relaxed) + step
    }

    /// Ticks every `period` until the returned task is aborted.
    pub fn spawn_ticker(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let value = self.tick(&mut rng);
                trace!(value, "Opportunity counter ticked");
            }
        })
    }
}

impl Default for OpportunityCounter {
    fn default() -> Self {
        Self::new(47, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_positive_and_bounded() {
        let counter = OpportunityCounter::new(47, 2);
        let mut rng = StdRng::seed_from_u64(7);
        let mut last = counter.get();
        for _ in 0..100 {
            let next = counter.tick(&mut rng);
            assert!(next > last && next - last <= 2);
            last = next;
        }
    }

    #[test]
    fn test_zero_max_increment_still_moves() {
        let counter = OpportunityCounter::new(0, 0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(counter.tick(&mut rng), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_advances_until_aborted() {
        let counter = Arc::new(OpportunityCounter::new(47, 2));
        let handle = counter.clone().spawn_ticker(Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(9_500)).await;
        let after_three = counter.get();
        assert!((50..=53).contains(&after_three), "got {after_three}");

        handle.abort();
        let _ = handle.await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(counter.get(), after_three);
    }
}
