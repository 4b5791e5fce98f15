//! Deterministic random number generation.
//!
//! Same seed produces the identical sequence, so a recorded session
//! replays against the same shuffles and deals it was recorded with.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for a game session.
///
/// Uses ChaCha8 for speed while keeping high quality randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random integer in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);

        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1000), b.gen_range(0..1000));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = GameRng::new(1);
        let mut b = GameRng::new(2);

        let seq_a: Vec<_> = (0..8).map(|_| a.gen_range(0..1_000_000)).collect();
        let seq_b: Vec<_> = (0..8).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_shuffle_deterministic() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);

        let mut deck_a: Vec<u32> = (0..20).collect();
        let mut deck_b: Vec<u32> = (0..20).collect();
        a.shuffle(&mut deck_a);
        b.shuffle(&mut deck_b);

        assert_eq!(deck_a, deck_b);
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(9);
        let items = [1, 2, 3];

        assert!(items.contains(rng.choose(&items).unwrap()));
        assert_eq!(rng.choose::<i32>(&[]), None);
    }
}
