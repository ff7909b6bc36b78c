//! Injectable randomness for the reactive policies.

use std::{
    ops::Deref,
    sync::{Arc, Mutex},
};

use rand::{Rng, SeedableRng, rngs::StdRng};

// Traits.

/// Source of uniform integers.
///
/// Every policy decision that involves chance goes through this trait so tests can script it.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync + 'static {
    /// Draws a uniform integer in `low..=high`.
    fn between(&self, low: usize, high: usize) -> usize;
}

// Structs.

/// Random source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn between(&self, low: usize, high: usize) -> usize {
        rand::rng().random_range(low..=high)
    }
}

/// Reproducible random source.
#[derive(Debug)]
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
    fn between(&self, low: usize, high: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(low..=high)
    }
}

/// Random client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RandomClient {
    inner: Arc<dyn RandomSource>,
}

impl Deref for RandomClient {
    type Target = dyn RandomSource;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Default for RandomClient {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl RandomClient {
    pub fn new(inner: Arc<dyn RandomSource>) -> Self {
        Self { inner }
    }

    /// Draws a uniform integer in `1..=100`.
    ///
    /// An out-of-range draw saturates at `u8::MAX`, which loses every percent check.
    pub fn roll_percent(&self) -> u8 {
        u8::try_from(self.between(1, 100)).unwrap_or(u8::MAX)
    }

    /// Picks one item uniformly, or `None` when there is nothing to pick from.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }

        items.get(self.between(0, items.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_on_empty_slice_does_not_draw() {
        let mut mock = MockRandomSource::new();
        mock.expect_between().never();

        let random = RandomClient::new(Arc::new(mock));
        let empty: [&str; 0] = [];

        assert!(random.pick(&empty).is_none());
    }

    #[test]
    fn pick_uses_the_drawn_index() {
        let mut mock = MockRandomSource::new();
        mock.expect_between().withf(|low, high| *low == 0 && *high == 2).times(1).return_const(1usize);

        let random = RandomClient::new(Arc::new(mock));

        assert_eq!(random.pick(&["a", "b", "c"]), Some(&"b"));
    }

    #[test]
    fn oversized_draw_saturates_instead_of_wrapping() {
        let mut mock = MockRandomSource::new();
        mock.expect_between().return_const(300usize);

        let random = RandomClient::new(Arc::new(mock));

        assert_eq!(random.roll_percent(), u8::MAX);
    }

    #[test]
    fn seeded_rolls_stay_in_range() {
        let random = RandomClient::new(Arc::new(SeededRandom::new(7)));

        for _ in 0..1000 {
            let roll = random.roll_percent();
            assert!((1..=100).contains(&roll));
        }
    }
}
