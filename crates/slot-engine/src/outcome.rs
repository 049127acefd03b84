//! Outcome generation: one uniformly drawn stop index per reel

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of uniform integers
///
/// The only randomness in the engine. Tests substitute a scripted source
/// instead of changing the algorithm.
pub trait UniformSource {
    /// Uniform draw from `[0, upper)`. `upper` is at least 1.
    fn next_below(&mut self, upper: usize) -> usize;
}

/// RNG-backed source
#[derive(Debug, Clone)]
pub struct RngSource {
    rng: ChaCha8Rng,
}

impl RngSource {
    /// Reproducible source for a seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy
    pub fn from_os_rng() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }

    /// Underlying generator, for strip generation at startup
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl UniformSource for RngSource {
    fn next_below(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..upper)
    }
}

/// Replays fixed stop rows, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values are consumed in order, one per reel per spin
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Convenience: a list of full spins, each one stop per reel
    pub fn from_spins(spins: &[&[usize]]) -> Self {
        Self::new(spins.iter().flat_map(|s| s.iter().copied()).collect())
    }
}

impl UniformSource for ScriptedSource {
    fn next_below(&mut self, upper: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value % upper
    }
}

/// The stop index of every reel for one spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRequest {
    /// Monotonic spin number within the session
    pub spin_id: u64,
    /// Target stop index per reel, each in `[0, symbols_per_reel)`
    pub targets: Vec<usize>,
}

impl SpinRequest {
    pub fn reel_count(&self) -> usize {
        self.targets.len()
    }
}

/// Draws independent uniform stops for every reel
pub struct OutcomeGenerator {
    source: Box<dyn UniformSource>,
}

impl OutcomeGenerator {
    pub fn new(source: Box<dyn UniformSource>) -> Self {
        Self { source }
    }

    /// Seeded generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(RngSource::seeded(seed)))
    }

    /// Entropy-seeded generator
    pub fn from_os_rng() -> Self {
        Self::new(Box::new(RngSource::from_os_rng()))
    }

    /// One stop per reel, each uniform in `[0, symbols_per_reel)`
    pub fn generate(&mut self, reel_count: usize, symbols_per_reel: usize) -> Vec<usize> {
        let upper = symbols_per_reel.max(1);
        (0..reel_count).map(|_| self.source.next_below(upper)).collect()
    }
}

impl std::fmt::Debug for OutcomeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeGenerator").finish_non_exhaustive()
    }
}
