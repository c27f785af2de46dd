//! Pseudo-random sources.
//!
//! The runtime only consumes uniform draws in `[0, 1)`. Production code uses
//! [`EntropyRandom`]; tests inject a [`ScriptedRandom`] so every mutation and
//! pulse decision is known in advance.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Random source shared by the scheduler's recurring tasks.
pub type SharedRandom = Rc<RefCell<dyn RandomSource>>;

/// Wrap a source for sharing between tasks.
pub fn shared<R: RandomSource + 'static>(source: R) -> SharedRandom {
    Rc::new(RefCell::new(source))
}

/// Entropy-seeded generator; not reproducible across runs.
#[derive(Debug, Clone)]
pub struct EntropyRandom {
    rng: SmallRng,
}

impl EntropyRandom {
    /// Seed from the platform entropy source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Fixed seed, for reproducible demos.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats `fallback` forever.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    queue: VecDeque<f64>,
    fallback: f64,
    drawn: usize,
}

impl ScriptedRandom {
    /// Script that falls back to `0.999` (no probabilistic branch taken).
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self::with_fallback(draws, 0.999)
    }

    /// Script with an explicit fallback draw.
    #[must_use]
    pub fn with_fallback(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            queue: draws.into_iter().collect(),
            fallback: clamp_unit(fallback),
            drawn: 0,
        }
    }

    /// Append draws to the script.
    pub fn push(&mut self, draws: impl IntoIterator<Item = f64>) {
        self.queue.extend(draws);
    }

    /// Draws consumed so far, fallbacks included.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.drawn
    }

    /// Scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.drawn += 1;
        self.queue.pop_front().map_or(self.fallback, clamp_unit)
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0 - f64::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replays_then_falls_back() {
        let mut rng = ScriptedRandom::with_fallback([0.1, 0.2], 0.5);
        assert_eq!(rng.next_unit(), 0.1);
        assert_eq!(rng.next_unit(), 0.2);
        assert_eq!(rng.next_unit(), 0.5);
        assert_eq!(rng.next_unit(), 0.5);
        assert_eq!(rng.drawn(), 4);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_scripted_clamps_to_half_open_unit() {
        let mut rng = ScriptedRandom::new([1.0, -3.0]);
        assert!(rng.next_unit() < 1.0);
        assert_eq!(rng.next_unit(), 0.0);
    }

    #[test]
    fn test_scripted_push() {
        let mut rng = ScriptedRandom::new([]);
        rng.push([0.25]);
        assert_eq!(rng.remaining(), 1);
        assert_eq!(rng.next_unit(), 0.25);
    }

    #[test]
    fn test_entropy_draws_in_unit_interval() {
        let mut rng = EntropyRandom::seeded(7);
        for _ in 0..1000 {
            let x = rng.next_unit();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = EntropyRandom::seeded(42);
        let mut b = EntropyRandom::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn test_shared_coerces_to_trait_object() {
        let rng = shared(ScriptedRandom::new([0.75]));
        assert_eq!(rng.borrow_mut().next_unit(), 0.75);
    }
}
