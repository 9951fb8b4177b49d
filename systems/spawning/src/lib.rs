#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting visitor spawn commands.

use std::time::Duration;

use faemaze_core::{CellCoord, Command, Event};
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    max_visitors: usize,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence, seed and visitor cap.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64, max_visitors: usize) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            max_visitors,
        }
    }

    /// Time between two spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Seed of the entrance selection generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Maximum number of visitors allowed inside the maze at once.
    #[must_use]
    pub const fn max_visitors(&self) -> usize {
        self.max_visitors
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_000), 0x5eed_fae5, 12)
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    max_visitors: usize,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            max_visitors: config.max_visitors,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current population to emit spawn commands.
    ///
    /// Intervals that elapse while the maze is full are consumed without spawning.
    pub fn handle(
        &mut self,
        events: &[Event],
        entrances: &[CellCoord],
        live_visitors: usize,
        out: &mut Vec<Command>,
    ) {
        if self.spawn_interval.is_zero() || entrances.is_empty() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();
        let capacity = self.max_visitors.saturating_sub(live_visitors);

        for attempt in 0..spawn_attempts {
            if attempt >= capacity {
                trace!("maze full; skipping {} spawns", spawn_attempts - attempt);
                break;
            }
            let entrance = self.select_entrance(entrances);
            out.push(Command::SpawnVisitor { entrance });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_entrance(&mut self, entrances: &[CellCoord]) -> CellCoord {
        debug_assert!(!entrances.is_empty(), "select_entrance requires entrances");
        entrances[self.rng.gen_range(0..entrances.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1, 4));
        spawning.accumulator = Duration::from_secs(10);
        assert_eq!(spawning.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn keeps_remainder_between_calls() {
        let mut spawning = Spawning::new(Config::new(Duration::from_millis(400), 1, 4));
        spawning.accumulator = Duration::from_millis(900);
        assert_eq!(spawning.resolve_spawn_attempts(), 2);
        assert_eq!(spawning.accumulator, Duration::from_millis(100));
    }
}
