//! Seedable random number generation.
//!
//! The shell uses randomness in two places: shuffling the card stack and
//! jittering sound pitch. Both draw from a [`ShellRng`] so a run can be
//! replayed from its seed.
//!
//! ```
//! use showcase_shell::core::ShellRng;
//!
//! let root = ShellRng::new(7);
//!
//! // Independent streams per purpose
//! let mut shuffle = root.for_context("cards");
//! let mut pitch = root.for_context("pitch");
//!
//! let mut deck = vec![0, 1, 2, 3];
//! shuffle.shuffle(&mut deck);
//! let jitter = pitch.gen_range_f64(0.0..2.0);
//! assert!((0.0..2.0).contains(&jitter));
//! ```

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct ShellRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl ShellRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream for a named purpose.
    ///
    /// The same context always yields the same stream for the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);

        Self::new(hasher.finish())
    }

    /// Random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Random float in the given range.
    pub fn gen_range_f64(&mut self, range: std::ops::Range<f64>) -> f64 {
        self.inner.gen_range(range)
    }

    /// Uniform shuffle in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the current position for replay.
    #[must_use]
    pub fn state(&self) -> ShellRngState {
        ShellRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Resume from a captured position.
    #[must_use]
    pub fn from_state(state: &ShellRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = ShellRng::new(42);
        let mut rng2 = ShellRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range_usize(0..1000), rng2.gen_range_usize(0..1000));
        }
    }

    #[test]
    fn test_contexts_diverge() {
        let rng = ShellRng::new(42);
        let mut cards = rng.for_context("cards");
        let mut pitch = rng.for_context("pitch");

        let seq1: Vec<_> = (0..10).map(|_| cards.gen_range_usize(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| pitch.gen_range_usize(0..1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = ShellRng::new(42);
        let mut data: Vec<u32> = (0..20).collect();

        rng.shuffle(&mut data);
        assert_ne!(data, (0..20).collect::<Vec<_>>());

        data.sort_unstable();
        assert_eq!(data, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_state_restore() {
        let mut rng = ShellRng::new(9);
        for _ in 0..50 {
            rng.gen_range_f64(0.0..1.0);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_range_usize(0..1000)).collect();

        let mut restored = ShellRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_range_usize(0..1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = ShellRngState { seed: 42, word_pos: 12345 };
        let json = serde_json::to_string(&state).unwrap();
        let back: ShellRngState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
