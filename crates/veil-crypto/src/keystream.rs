//! Seed-derived keystream for the Vernam layer.
//!
//! SHA-512 in counter mode: block `j` is `SHA-512(seed || j as u64 BE)`, and
//! bit `i` of the stream is bit `i % 512` (MSB first) of block `i / 512`.
//! Bit `i` therefore depends on `(seed, i)` only, so a stream can be
//! restarted or indexed without replaying its prefix.

use sha2::{Digest, Sha512};
use zeroize::Zeroize;

const BLOCK_BYTES: usize = 64;
const BLOCK_BITS: u64 = (BLOCK_BYTES * 8) as u64;

/// Unbounded, lazily evaluated bit sequence derived from a seed.
#[derive(Clone)]
pub struct Keystream {
    seed: Vec<u8>,
    position: u64,
    block: [u8; BLOCK_BYTES],
    block_index: Option<u64>,
}

impl Keystream {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            seed: seed.to_vec(),
            position: 0,
            block: [0u8; BLOCK_BYTES],
            block_index: None,
        }
    }

    /// Index of the next bit `next()` will yield.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Rewind to bit 0.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    /// Random access to bit `index` without moving the cursor.
    pub fn bit_at(&self, index: u64) -> bool {
        let block = derive_block(&self.seed, index / BLOCK_BITS);
        bit_in_block(&block, index % BLOCK_BITS)
    }
}

impl Iterator for Keystream {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let counter = self.position / BLOCK_BITS;
        if self.block_index != Some(counter) {
            self.block = derive_block(&self.seed, counter);
            self.block_index = Some(counter);
        }
        let bit = bit_in_block(&self.block, self.position % BLOCK_BITS);
        self.position += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl Drop for Keystream {
    fn drop(&mut self) {
        self.seed.zeroize();
        self.block.zeroize();
    }
}

fn derive_block(seed: &[u8], counter: u64) -> [u8; BLOCK_BYTES] {
    let mut hasher = Sha512::new();
    hasher.update(seed);
    hasher.update(counter.to_be_bytes());
    let digest = hasher.finalize();
    let mut block = [0u8; BLOCK_BYTES];
    block.copy_from_slice(&digest);
    block
}

fn bit_in_block(block: &[u8; BLOCK_BYTES], offset: u64) -> bool {
    let offset = offset as usize;
    (block[offset / 8] >> (7 - offset % 8)) & 1 == 1
}
