use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Shortest time, in milliseconds, a phase is shown.
pub const MIN_CYCLE_MS: u64 = 4000;

/// Longest time, in milliseconds, a phase is shown.
pub const MAX_CYCLE_MS: u64 = 6000;

/// Source of the durations for which each phase is shown.
///
/// The timer is moved into the phase cycle worker when the light starts, so it is only ever
/// used from one thread.
pub trait PhaseTimer {
    /// Returns how long the next phase lasts before the light toggles.
    fn next_cycle(&mut self) -> Duration;
}

/// Timer drawing every cycle uniformly from [`MIN_CYCLE_MS`]..=[`MAX_CYCLE_MS`] milliseconds.
///
/// The random generator is seeded once, when the timer is built.
#[derive(Debug)]
pub struct RandomPhaseTimer<R = StdRng> {
    rng: R,
}

impl RandomPhaseTimer<StdRng> {
    /// Creates a timer seeded from the operating system's entropy source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a timer with a fixed seed, producing the same sequence of cycles on every run.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R> RandomPhaseTimer<R>
where
    R: Rng,
{
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomPhaseTimer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> PhaseTimer for RandomPhaseTimer<R>
where
    R: Rng,
{
    fn next_cycle(&mut self) -> Duration {
        Duration::from_millis(self.rng.random_range(MIN_CYCLE_MS..=MAX_CYCLE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWS: usize = 20_000;
    const BUCKETS: usize = 4;

    #[test]
    fn test_cycles_are_within_bounds() {
        let mut timer = RandomPhaseTimer::new();

        for _ in 0..1_000 {
            let cycle = timer.next_cycle();
            assert!(cycle >= Duration::from_millis(MIN_CYCLE_MS));
            assert!(cycle <= Duration::from_millis(MAX_CYCLE_MS));
        }
    }

    #[test]
    fn test_cycles_are_uniformly_distributed() {
        let mut timer = RandomPhaseTimer::seeded(7);
        let span = (MAX_CYCLE_MS - MIN_CYCLE_MS + 1) as usize;
        let mut buckets = [0usize; BUCKETS];

        for _ in 0..DRAWS {
            let offset = timer.next_cycle().as_millis() as usize - MIN_CYCLE_MS as usize;
            buckets[offset * BUCKETS / span] += 1;
        }

        let expected = DRAWS / BUCKETS;
        for (bucket, count) in buckets.iter().enumerate() {
            let deviation = count.abs_diff(expected) as f64 / expected as f64;
            assert!(
                deviation < 0.1,
                "bucket {bucket} holds {count} draws, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_seeded_timers_are_deterministic() {
        let mut first = RandomPhaseTimer::seeded(42);
        let mut second = RandomPhaseTimer::seeded(42);

        for _ in 0..100 {
            assert_eq!(first.next_cycle(), second.next_cycle());
        }
    }
}
