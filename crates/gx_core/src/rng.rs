// crates/gx_core/src/rng.rs
//
// Request-scoped, integer-only RNG for matching draws and simulation runs.
// Focus: unbiased range generation, stable seeding, per-run stream derivation.
//
// • Every seeded call owns its own `ExchangeRng`; there is no process-wide state.
// • Integer-only: unbiased ranges via rejection sampling, no floats.
// • Cross-platform determinism: explicit seed-to-key mapping and word accounting.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic ChaCha20 generator owned by a single request (or a single
/// simulation run).
///
/// The mapping from `u64` seed to the 32-byte ChaCha key is explicit:
/// `seed.to_le_bytes()` into bytes 0..8, an optional run index into bytes
/// 8..16, the remaining bytes zero.
#[derive(Debug, Clone)]
pub struct ExchangeRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl ExchangeRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::from_key(seed, 0)
    }

    /// Independent stream for simulation run `run_index` under `seed`.
    ///
    /// Run 0 uses key `(seed, 1)` so it never aliases `from_seed_u64(seed)`.
    #[inline]
    pub fn for_run(seed: u64, run_index: u64) -> Self {
        Self::from_key(seed, run_index.wrapping_add(1))
    }

    fn from_key(seed: u64, lane: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        seed32[8..16].copy_from_slice(&lane.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Total number of 64-bit words drawn so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    /// Draw the next u64 and advance the word counter.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)`; `None` if `n == 0`.
    ///
    /// `threshold = 2^64 mod n`; accept `x >= threshold`, then `x % n` is uniform.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Uniform index in `[0, n)`; `None` if `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// In-place Fisher–Yates shuffle:
    /// for i in (1..len).rev() { j ~ U{0..=i}; swap(i, j) }
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        if len <= 1 {
            return;
        }
        for i in (1..len).rev() {
            let j = match self.gen_range((i as u64) + 1) {
                Some(v) => v as usize,
                None => unreachable!("gen_range(>0) must return Some"),
            };
            slice.swap(i, j);
        }
    }

    /// Sattolo's algorithm: a uniformly random single cycle of length `len`.
    /// For `len >= 2` the result never maps an index to itself.
    pub fn cyclic_permutation(&mut self, len: usize) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = match self.gen_range(i as u64) {
                Some(v) => v as usize,
                None => unreachable!("gen_range(>0) must return Some"),
            };
            perm.swap(i, j);
        }
        perm
    }
}

impl Default for ExchangeRng {
    fn default() -> Self {
        Self::from_seed_u64(0)
    }
}
