//! Seedable random source.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

/// Golden-ratio increment used to spread derived seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random source consumed by every generator.
///
/// All bounded methods are inclusive on both ends and return the lower bound
/// when the range is empty or degenerate, so a misconfigured caller can never
/// make generation panic.
#[derive(Debug, Clone)]
pub struct Random {
    /// Seed this source was created with, reported for reproduction
    seed: u64,
    /// Seeded random number generator for reproducibility
    rng: StdRng,
}

impl Random {
    /// Create a random source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a random source with a seed drawn from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed of the `index`-th item of a batch started from `base`.
    ///
    /// This allows jumping to any item while keeping the batch deterministic.
    pub fn derive_seed(base: u64, index: u64) -> u64 {
        base.wrapping_add(index.wrapping_mul(SEED_STRIDE))
    }

    /// Independent source seeded from this one.
    pub fn fork(&mut self) -> Random {
        Random::new(self.rng.random())
    }

    pub fn int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    pub fn long_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    pub fn usize_range(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    pub fn double_range(&mut self, min: f64, max: f64) -> f64 {
        if !(min < max) {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    pub fn true_or_false(&mut self) -> bool {
        self.rng.random()
    }

    /// `true` with the given probability, clamped to `[0, 1]`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    /// Uppercase ASCII letter.
    pub fn upper_char(&mut self) -> char {
        char::from(self.rng.random_range(b'A'..=b'Z'))
    }

    /// String of `length` uppercase ASCII letters.
    pub fn alphabetic(&mut self, length: usize) -> String {
        (0..length).map(|_| self.upper_char()).collect()
    }

    /// Random element of a slice, `None` if empty.
    pub fn one_of<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.rng.random_range(0..items.len()))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_are_inclusive() {
        let mut random = Random::new(42);
        let mut seen_min = false;
        let mut seen_max = false;

        for _ in 0..500 {
            let value = random.int_range(1, 3);
            assert!((1..=3).contains(&value));
            seen_min |= value == 1;
            seen_max |= value == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut random = Random::new(42);
        assert_eq!(random.int_range(5, 5), 5);
        assert_eq!(random.long_range(9, 2), 9);
        assert_eq!(random.usize_range(3, 3), 3);
        assert_eq!(random.double_range(1.5, 1.5), 1.5);
    }

    #[test]
    fn test_deterministic_generation() {
        let mut first = Random::new(7);
        let mut second = Random::new(7);

        let a: Vec<i64> = (0..20).map(|_| first.long_range(0, 1_000_000)).collect();
        let b: Vec<i64> = (0..20).map(|_| second.long_range(0, 1_000_000)).collect();
        assert_eq!(a, b);
        assert_eq!(first.alphabetic(12), second.alphabetic(12));
    }

    #[test]
    fn test_alphabetic() {
        let mut random = Random::new(1);
        let s = random.alphabetic(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fork_is_independent_but_reproducible() {
        let mut parent_a = Random::new(3);
        let mut parent_b = Random::new(3);

        let mut child_a = parent_a.fork();
        let mut child_b = parent_b.fork();
        assert_eq!(child_a.seed(), child_b.seed());
        assert_ne!(child_a.seed(), 3);
        assert_eq!(child_a.long_range(0, 1 << 40), child_b.long_range(0, 1 << 40));
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(Random::derive_seed(42, 0), 42);
        assert_ne!(Random::derive_seed(42, 1), Random::derive_seed(42, 2));
        assert_eq!(Random::derive_seed(u64::MAX, 1), u64::MAX.wrapping_add(SEED_STRIDE));
    }

    #[test]
    fn test_one_of_and_shuffle() {
        let mut random = Random::new(11);
        assert_eq!(random.one_of::<i32>(&[]), None);
        assert_eq!(random.one_of(&[4]), Some(&4));

        let mut items: Vec<u32> = (0..50).collect();
        random.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(items, sorted);
    }
}
