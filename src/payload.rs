//! Construction of the in-memory payload.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::alphabet::Alphabet;
use crate::config::{GeneratorConfig, Order};
use crate::error::{GarbageError, Result};

/// Number of repetitions of each character: `floor(size / k)`.
pub fn chunk_size(size: u64, k: usize) -> u64 {
    if k == 0 {
        return 0;
    }
    size / k as u64
}

/// A finished payload buffer.
#[derive(Debug, Clone)]
pub struct Payload {
    bytes: Vec<u8>,
    chunk: usize,
    order: Order,
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Repetitions of each alphabet character.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

/// Each alphabet character repeated `chunk_size(size, k)` times, in alphabet order.
///
/// Fails with [`GarbageError::InvalidSize`] if the payload cannot be addressed on
/// this platform.
pub fn build_sequential(alphabet: &Alphabet, size: u64) -> Result<Payload> {
    let chunk = usize::try_from(chunk_size(size, alphabet.len()))
        .map_err(|_| GarbageError::InvalidSize(format!("{size} bytes does not fit in memory")))?;
    let total = chunk
        .checked_mul(alphabet.len())
        .ok_or_else(|| GarbageError::InvalidSize(format!("{size} bytes does not fit in memory")))?;

    let mut bytes = Vec::with_capacity(total);
    for &ch in alphabet.as_bytes() {
        bytes.resize(bytes.len() + chunk, ch);
    }
    debug!(
        "built sequential payload: {} bytes, {} x {} characters",
        bytes.len(),
        alphabet.len(),
        chunk
    );

    Ok(Payload {
        bytes,
        chunk,
        order: Order::Sequential,
    })
}

// Sequential payload, then a uniform shuffle
pub fn build_shuffled<R: Rng + ?Sized>(alphabet: &Alphabet, size: u64, rng: &mut R) -> Result<Payload> {
    let mut payload = build_sequential(alphabet, size)?;
    payload.bytes.shuffle(rng);
    payload.order = Order::Shuffled;
    debug!("shuffled payload of {} bytes", payload.len());
    Ok(payload)
}

/// Builds the payload described by `config`, seeding the RNG when a seed is set.
pub fn build(config: &GeneratorConfig) -> Result<Payload> {
    match (config.variant.order(), config.seed) {
        (Order::Sequential, _) => build_sequential(&config.alphabet, config.size),
        (Order::Shuffled, Some(seed)) => {
            build_shuffled(&config.alphabet, config.size, &mut StdRng::seed_from_u64(seed))
        }
        (Order::Shuffled, None) => build_shuffled(&config.alphabet, config.size, &mut rand::rng()),
    }
}
