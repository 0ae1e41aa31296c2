//! Randomness port.
//!
//! All engine randomness — main-rank draw, demon-card pick, deck shuffle,
//! first-player pick, shot rolls, owner reassignment — flows through
//! [`RandomSource`], so outcomes are fully reproducible under [`SeededRng`]
//! or [`FixedSequence`].

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::game::entities::Card;

/// Uniform integer draws and card shuffling, supplied by the host.
pub trait RandomSource: Send {
    /// Uniform draw in `[min, max]`, both ends inclusive.
    ///
    /// # Panics
    ///
    /// Panics if `max < min`; callers own the range contract.
    fn next_int_inclusive(&mut self, min: u32, max: u32) -> u32;

    /// Uniform random permutation of `cards` in place.
    fn shuffle(&mut self, cards: &mut [Card]);
}

/// Production source backed by the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        assert!(max >= min, "max must be >= min ({max} < {min})");
        rand::rng().random_range(min..=max)
    }

    fn shuffle(&mut self, cards: &mut [Card]) {
        cards.shuffle(&mut rand::rng());
    }
}

/// Deterministic source for tests, benches, and replay.
///
/// The same seed reproduces the same deals, rolls, and tie-breaks.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn next_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        assert!(max >= min, "max must be >= min ({max} < {min})");
        self.inner.random_range(min..=max)
    }

    fn shuffle(&mut self, cards: &mut [Card]) {
        cards.shuffle(&mut self.inner);
    }
}

/// Test double replaying a fixed sequence of draws.
///
/// Shuffles are no-ops so card order stays predictable. Draws panic when the
/// sequence is exhausted or a replayed value falls outside the requested
/// range, so a drifting call pattern fails loudly instead of skewing the
/// scenario under test.
#[derive(Clone, Debug)]
pub struct FixedSequence {
    values: Vec<u32>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        assert!(max >= min, "max must be >= min ({max} < {min})");
        let Some(&next) = self.values.get(self.cursor) else {
            panic!("fixed random sequence exhausted after {} draws", self.cursor);
        };
        self.cursor += 1;
        assert!(
            (min..=max).contains(&next),
            "fixed random value {next} not in [{min}, {max}]"
        );
        next
    }

    fn shuffle(&mut self, _cards: &mut [Card]) {}
}
