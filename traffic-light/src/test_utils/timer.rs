use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::timer::PhaseTimer;

/// Timer returning the same duration for every cycle and counting how many cycles were drawn.
#[derive(Debug, Clone)]
pub struct FixedPhaseTimer {
    cycle: Duration,
    draws: Arc<AtomicUsize>,
}

impl FixedPhaseTimer {
    pub fn new(cycle: Duration) -> Self {
        Self {
            cycle,
            draws: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns how many cycles were drawn so far, across all clones of this timer.
    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

impl PhaseTimer for FixedPhaseTimer {
    fn next_cycle(&mut self) -> Duration {
        self.draws.fetch_add(1, Ordering::SeqCst);
        self.cycle
    }
}

/// Timer playing back a fixed list of durations, then repeating `fallback` forever.
///
/// Useful to let a light toggle a known number of times quickly and then hold its phase.
#[derive(Debug, Clone)]
pub struct ScriptedPhaseTimer {
    script: VecDeque<Duration>,
    fallback: Duration,
}

impl ScriptedPhaseTimer {
    pub fn new(script: impl IntoIterator<Item = Duration>, fallback: Duration) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }
}

impl PhaseTimer for ScriptedPhaseTimer {
    fn next_cycle(&mut self) -> Duration {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

/// Timer that panics once it runs out of `cycles`, to exercise worker panic handling.
#[derive(Debug, Clone)]
pub struct PanickingPhaseTimer {
    cycles: usize,
    cycle: Duration,
}

impl PanickingPhaseTimer {
    pub fn new(cycles: usize, cycle: Duration) -> Self {
        Self { cycles, cycle }
    }
}

impl PhaseTimer for PanickingPhaseTimer {
    fn next_cycle(&mut self) -> Duration {
        if self.cycles == 0 {
            panic!("phase timer exhausted");
        }

        self.cycles -= 1;
        self.cycle
    }
}
