use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of randomness for fleet selection and ride ids.
///
/// Selection and id generation each get their own instance so tests can pin
/// one without disturbing the other.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..bound`. `bound` is never zero.
    fn index(&self, bound: usize) -> usize;

    fn fill(&self, dest: &mut [u8]);
}

/// Thread-local generator, the default in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }

    fn fill(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}

/// Reproducible generator for tests and local replays.
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
    fn index(&self, bound: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..bound)
    }

    fn fill(&self, dest: &mut [u8]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.fill_bytes(dest);
    }
}
