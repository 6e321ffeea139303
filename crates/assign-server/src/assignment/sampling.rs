//! Randomized reviewer selection.
//!
//! Selection goes through the `RandomSource` trait so tests can script the
//! exact sequence of draws. `sample` is a Fisher-Yates shuffle followed by
//! taking the prefix, which gives every subset of the requested size the same
//! probability when the source is uniform.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use rand::{Rng, SeedableRng, rngs::StdRng};

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..upper`. Callers never pass zero.
    fn index_below(&self, upper: usize) -> usize;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index_below(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

/// Reproducible generator seeded from a fixed value.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index_below(&self, upper: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(0..upper)
    }
}

/// Replays a fixed list of draws, each reduced modulo the requested bound.
/// Once exhausted it keeps returning 0.
#[derive(Default)]
pub struct ScriptedRandom {
    draws: Mutex<VecDeque<usize>>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index_below(&self, upper: usize) -> usize {
        let mut draws = self.draws.lock().unwrap_or_else(PoisonError::into_inner);
        draws.pop_front().map_or(0, |draw| draw % upper)
    }
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T], random: &dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = random.index_below(i + 1);
        items.swap(i, j);
    }
}

/// Up to `count` items drawn without replacement.
///
/// Pools no larger than `count` come back whole and in their original order.
pub fn sample<T>(mut items: Vec<T>, count: usize, random: &dyn RandomSource) -> Vec<T> {
    if items.len() <= count {
        return items;
    }
    shuffle(&mut items, random);
    items.truncate(count);
    items
}

pub fn pick_one<T>(mut items: Vec<T>, random: &dyn RandomSource) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = random.index_below(items.len());
    Some(items.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sample_small_pool_is_returned_whole() {
        let pool = vec!["a", "b"];
        let picked = sample(pool.clone(), 2, &ScriptedRandom::new([1, 1]));
        assert_eq!(picked, pool);
    }

    #[test]
    fn test_sample_empty_pool() {
        let picked: Vec<&str> = sample(Vec::new(), 2, &ThreadRandom);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_sample_follows_scripted_draws() {
        // len 4: i=3 swaps with 0, i=2 swaps with 2, i=1 swaps with 0
        // [a,b,c,d] -> [d,b,c,a] -> [d,b,c,a] -> [b,d,c,a]
        let picked = sample(vec!["a", "b", "c", "d"], 2, &ScriptedRandom::new([0, 2, 0]));
        assert_eq!(picked, vec!["b", "d"]);
    }

    #[test]
    fn test_sample_is_distinct_and_sized() {
        let random = SeededRandom::new(7);
        for _ in 0..200 {
            let picked = sample((0..10).collect::<Vec<_>>(), 2, &random);
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
        }
    }

    #[test]
    fn test_sample_reaches_every_member() {
        let random = SeededRandom::new(42);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(sample(vec![1, 2, 3, 4, 5], 2, &random));
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_pick_one() {
        assert_eq!(pick_one(Vec::<u8>::new(), &ThreadRandom), None);
        assert_eq!(
            pick_one(vec!["x", "y", "z"], &ScriptedRandom::new([2])),
            Some("z")
        );
    }

    #[test]
    fn test_scripted_random_wraps_and_defaults() {
        let random = ScriptedRandom::new([7]);
        assert_eq!(random.index_below(3), 1);
        assert_eq!(random.index_below(3), 0);
    }
}
