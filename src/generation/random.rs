//! Replayable uniform draw streams

use rand::{Rng, SeedableRng, rngs::StdRng};
use sha2::{Digest, Sha256};

/// Source of uniform draws in `[0, 1)`
///
/// Generation consumes exactly one draw per attribute, so any source that
/// yields the same sequence reproduces the same tokens.
pub trait DrawSource {
    /// Next uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Discard `count` draws
    fn skip(&mut self, count: usize) {
        for _ in 0..count {
            let _ = self.next_unit();
        }
    }
}

/// Seeded pseudo-random stream
///
/// String seeds are hashed with SHA-256 into the generator's 32-byte seed so
/// that arbitrary text (including UUIDs) gives a well-mixed stream.
pub struct SeededStream {
    rng: StdRng,
    drawn: u64,
}

impl SeededStream {
    /// Create a deterministic stream from a seed string
    pub fn from_seed_str(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self {
            rng: StdRng::from_seed(digest),
            drawn: 0,
        }
    }

    /// Create a deterministic stream from a numeric seed
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            drawn: 0,
        }
    }

    /// Number of draws consumed so far
    pub const fn drawn(&self) -> u64 {
        self.drawn
    }
}

impl DrawSource for SeededStream {
    fn next_unit(&mut self) -> f64 {
        self.drawn += 1;
        self.rng.random::<f64>()
    }
}

/// Fixed sequence of draws, repeated once exhausted
///
/// Useful for replaying recorded draws and for forcing specific picks.
#[derive(Clone, Debug)]
pub struct ScriptedDraws {
    values: Vec<f64>,
    position: usize,
}

impl ScriptedDraws {
    /// Create a stream over the given values
    ///
    /// Values are clamped into `[0, 1)`; an empty list always yields zero.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            position: 0,
        }
    }
}

impl DrawSource for ScriptedDraws {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self
            .values
            .get(self.position % self.values.len())
            .copied()
            .unwrap_or(0.0);
        self.position += 1;
        value
    }
}

/// Fisher-Yates shuffle driven by a draw source
///
/// Walks from the back, swapping each slot with `floor(draw * (i + 1))`.
pub fn shuffle<T, R: DrawSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = ((rng.next_unit() * (i + 1) as f64).floor() as usize).min(i);
        items.swap(i, j);
    }
}
