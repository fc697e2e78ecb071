//! Table-driven GHASH.

use core::fmt;

use sm4_core::{Block, BLOCK_SIZE};
use zeroize::Zeroize;

use crate::field::{from_block, mul_x, to_block};

const POSITIONS: usize = BLOCK_SIZE;
const VALUES: usize = 256;

/// Partial products of the hash subkey `H`.
///
/// Entry `(position, value)` holds `E · H`, where `E` is the field element
/// whose byte at `position` equals `value` and whose other bytes are zero.
/// A full product `X · H` is then the XOR of the 16 entries selected by the
/// bytes of `X`.
#[derive(Clone)]
pub struct MulTable {
    data: Box<[u128]>,
}

impl MulTable {
    /// Builds the table for the hash subkey `h`.
    pub fn new(h: &Block) -> Self {
        let mut data = vec![0u128; POSITIONS * VALUES].into_boxed_slice();

        // Walk H · x^k for k = 0..128: bit `b` (MSB first) of byte `pos` is x^(8·pos + b).
        let mut power = from_block(h);
        for pos in 0..POSITIONS {
            for bit in 0..8 {
                data[entry_index(pos, 0x80 >> bit)] = power;
                power = mul_x(power);
            }
            for value in 1..VALUES {
                let top = 1usize << (usize::BITS - 1 - value.leading_zeros());
                if top != value {
                    data[entry_index(pos, value)] =
                        data[entry_index(pos, top)] ^ data[entry_index(pos, value ^ top)];
                }
            }
        }
        power.zeroize();

        Self { data }
    }

    /// Reads the entry for `(position, value)`.
    pub fn get(&self, position: usize, value: u8) -> Block {
        to_block(self.data[entry_index(position, value as usize)])
    }

    /// Multiplies `x` by `H` with 16 lookups.
    #[inline]
    pub fn mul_h(&self, x: u128) -> u128 {
        x.to_be_bytes()
            .iter()
            .enumerate()
            .fold(0, |acc, (pos, &byte)| {
                acc ^ self.data[entry_index(pos, byte as usize)]
            })
    }
}

impl Drop for MulTable {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl fmt::Debug for MulTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulTable").finish_non_exhaustive()
    }
}

#[inline]
const fn entry_index(position: usize, value: usize) -> usize {
    (position << 8) | value
}

#[derive(Clone, Debug)]
enum Backend {
    Table(MulTable),
    #[cfg(all(feature = "clmul", any(target_arch = "x86", target_arch = "x86_64")))]
    Clmul(crate::clmul::ClmulKey),
}

/// Per-key GHASH state: the multiplier for one hash subkey.
///
/// Read-only once built, so one instance can back any number of concurrent
/// [`GHash`] computations under the same key.
#[derive(Clone, Debug)]
pub struct GaloisHasher {
    backend: Backend,
}

impl GaloisHasher {
    /// Builds the hasher for subkey `h`, preferring carry-less multiplication
    /// when the `clmul` feature is on and the CPU supports it.
    pub fn new(h: &Block) -> Self {
        #[cfg(all(feature = "clmul", any(target_arch = "x86", target_arch = "x86_64")))]
        if let Some(key) = crate::clmul::ClmulKey::new(from_block(h)) {
            return Self {
                backend: Backend::Clmul(key),
            };
        }
        Self::portable(h)
    }

    /// Builds the byte-table hasher regardless of CPU features.
    pub fn portable(h: &Block) -> Self {
        Self {
            backend: Backend::Table(MulTable::new(h)),
        }
    }

    /// Short name of the multiplier in use.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Table(_) => "table",
            #[cfg(all(feature = "clmul", any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Clmul(_) => "clmul",
        }
    }

    /// Multiplies `x` by the hash subkey.
    #[inline]
    pub fn mul_h(&self, x: u128) -> u128 {
        match &self.backend {
            Backend::Table(table) => table.mul_h(x),
            #[cfg(all(feature = "clmul", any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Clmul(key) => key.mul(x),
        }
    }

    /// Starts a new hash computation with a zero accumulator.
    pub fn start(&self) -> GHash<'_> {
        GHash {
            hasher: self,
            acc: 0,
        }
    }

    /// Hashes `data`, zero-padding a trailing partial block.
    pub fn hash(&self, data: &[u8]) -> Block {
        let mut ghash = self.start();
        ghash.update_padded(data);
        ghash.finalize()
    }
}

/// Running GHASH over a sequence of blocks.
pub struct GHash<'a> {
    hasher: &'a GaloisHasher,
    acc: u128,
}

impl GHash<'_> {
    /// Absorbs one full block.
    #[inline]
    pub fn update_block(&mut self, block: &Block) {
        self.acc = self.hasher.mul_h(self.acc ^ from_block(block));
    }

    /// Absorbs `data`, zero-padding a trailing partial block.
    pub fn update_padded(&mut self, data: &[u8]) {
        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        for chunk in chunks.by_ref() {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            self.update_block(&block);
        }
        let rest = chunks.remainder();
        if !rest.is_empty() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..rest.len()].copy_from_slice(rest);
            self.update_block(&block);
        }
    }

    /// Absorbs the block `{high: u64, low: u64}`, both big-endian.
    pub fn update_lengths(&mut self, high: u64, low: u64) {
        let mut block = [0u8; BLOCK_SIZE];
        block[..8].copy_from_slice(&high.to_be_bytes());
        block[8..].copy_from_slice(&low.to_be_bytes());
        self.update_block(&block);
    }

    /// Returns the accumulator.
    pub fn finalize(mut self) -> Block {
        let out = to_block(self.acc);
        self.acc.zeroize();
        out
    }
}

impl fmt::Debug for GHash<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GHash").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::gf_mul;
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn table_matches_reference_multiplication() {
        let mut rng = ChaCha20Rng::from_seed([40u8; 32]);
        for _ in 0..16 {
            let mut h = [0u8; 16];
            rng.fill_bytes(&mut h);
            let table = MulTable::new(&h);
            for _ in 0..16 {
                let x: u128 = rng.gen();
                assert_eq!(table.mul_h(x), gf_mul(x, from_block(&h)));
            }
        }
    }

    #[test]
    fn entries_are_single_byte_products() {
        let mut rng = ChaCha20Rng::from_seed([41u8; 32]);
        let mut h = [0u8; 16];
        rng.fill_bytes(&mut h);
        let table = MulTable::new(&h);
        for pos in [0usize, 7, 15] {
            for value in [0u8, 1, 0x80, 0xe1, 0xff] {
                let mut e = [0u8; 16];
                e[pos] = value;
                let expected = gf_mul(from_block(&e), from_block(&h));
                assert_eq!(table.get(pos, value), to_block(expected));
            }
        }
        assert_eq!(table.get(3, 0), [0u8; 16]);
    }

    #[test]
    fn zero_subkey_hashes_to_zero() {
        let hasher = GaloisHasher::portable(&[0u8; 16]);
        assert_eq!(hasher.hash(b"anything at all, of any length"), [0u8; 16]);
    }

    #[test]
    fn padded_update_matches_explicit_blocks() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        let mut h = [0u8; 16];
        rng.fill_bytes(&mut h);
        let hasher = GaloisHasher::portable(&h);

        let mut data = [0u8; 37];
        rng.fill_bytes(&mut data);

        let mut explicit = hasher.start();
        let mut b0 = [0u8; 16];
        let mut b1 = [0u8; 16];
        let mut b2 = [0u8; 16];
        b0.copy_from_slice(&data[..16]);
        b1.copy_from_slice(&data[16..32]);
        b2[..5].copy_from_slice(&data[32..]);
        explicit.update_block(&b0);
        explicit.update_block(&b1);
        explicit.update_block(&b2);

        assert_eq!(hasher.hash(&data), explicit.finalize());
    }

    #[test]
    fn empty_input_leaves_accumulator_zero() {
        let hasher = GaloisHasher::portable(&[0x5a; 16]);
        assert_eq!(hasher.hash(&[]), [0u8; 16]);
    }

    #[test]
    fn hasher_matches_reference_over_messages() {
        let mut rng = ChaCha20Rng::from_seed([43u8; 32]);
        for len in [1usize, 15, 16, 17, 64, 100] {
            let mut h = [0u8; 16];
            rng.fill_bytes(&mut h);
            let mut data = vec![0u8; len];
            rng.fill_bytes(&mut data);

            let hv = from_block(&h);
            let mut expected = 0u128;
            for chunk in data.chunks(16) {
                let mut block = [0u8; 16];
                block[..chunk.len()].copy_from_slice(chunk);
                expected = gf_mul(expected ^ from_block(&block), hv);
            }

            assert_eq!(GaloisHasher::new(&h).hash(&data), to_block(expected));
            assert_eq!(GaloisHasher::portable(&h).hash(&data), to_block(expected));
        }
    }
}
