//! Suffixes appended to repeated lease references

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const SUFFIX_LEN: usize = 4;

/// Source of suffixes for duplicate lease references
pub trait SuffixGenerator {
    fn next_suffix(&mut self) -> String;
}

impl<F> SuffixGenerator for F
where
    F: FnMut() -> String,
{
    fn next_suffix(&mut self) -> String {
        self()
    }
}

/// Draws [`SUFFIX_LEN`] characters uniformly from [`SUFFIX_ALPHABET`]
pub struct RandomSuffix<R: Rng> {
    rng: R,
}

impl RandomSuffix<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> SuffixGenerator for RandomSuffix<R> {
    fn next_suffix(&mut self) -> String {
        (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[self.rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect()
    }
}
