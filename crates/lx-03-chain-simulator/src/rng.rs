//! # Deterministic Generator
//!
//! Every simulated random value comes from here, so a whole history is
//! reproducible from its seed: same seed plus same call sequence gives the
//! same output sequence.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared_types::{Address, Hash, ValidationError};

/// Seeded pseudo-random source.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// An integer in the inclusive range `[min, max]`. Bounds are swapped if
    /// given in the wrong order.
    pub fn next_int(&mut self, min: u64, max: u64) -> u64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.inner.gen_range(lo..=hi)
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly pick one element.
    pub fn pick_one<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyChoice);
        }
        let index = self.next_int(0, items.len() as u64 - 1) as usize;
        Ok(&items[index])
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as u64) as usize;
            items.swap(i, j);
        }
    }

    pub fn next_hash(&mut self) -> Hash {
        let mut bytes = [0u8; 32];
        self.inner.fill_bytes(&mut bytes);
        Hash::from_bytes(&bytes)
    }

    pub fn next_address(&mut self) -> Address {
        let mut bytes = [0u8; 20];
        self.inner.fill_bytes(&mut bytes);
        Address::from_bytes(&bytes)
    }
}
