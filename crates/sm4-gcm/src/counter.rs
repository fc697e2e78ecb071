//! Initial counter block derivation and the CTR keystream.

use sm4_core::{Block, Sm4, BLOCK_SIZE};
use tracing::trace;
use zeroize::Zeroize;

use crate::aead::NONCE_SIZE;
use crate::error::Error;
use crate::ghash::GaloisHasher;

/// Derives the pre-counter block `J0` from a nonce.
///
/// A 96-bit nonce is used directly with a 32-bit counter of one appended;
/// any other length is hashed together with its bit length.
pub(crate) fn derive_j0(hasher: &GaloisHasher, nonce: &[u8]) -> Result<Block, Error> {
    if nonce.is_empty() {
        return Err(Error::InvalidNonceLength);
    }
    if nonce.len() == NONCE_SIZE {
        let mut j0 = [0u8; BLOCK_SIZE];
        j0[..NONCE_SIZE].copy_from_slice(nonce);
        j0[BLOCK_SIZE - 1] = 1;
        return Ok(j0);
    }

    trace!(nonce_len = nonce.len(), "hashing non-96-bit nonce into J0");
    let mut ghash = hasher.start();
    ghash.update_padded(nonce);
    ghash.update_lengths(0, bit_len(nonce.len()));
    Ok(ghash.finalize())
}

/// Increments the low 32 bits of a counter block modulo 2^32.
#[inline]
pub(crate) fn inc32(block: &mut Block) {
    let low = u32::from_be_bytes([block[12], block[13], block[14], block[15]]).wrapping_add(1);
    block[12..].copy_from_slice(&low.to_be_bytes());
}

/// Length of `len` bytes in bits.
#[inline]
pub(crate) fn bit_len(len: usize) -> u64 {
    (len as u64).wrapping_mul(8)
}

/// Counter-mode keystream over one message.
pub(crate) struct Ctr<'a> {
    cipher: &'a Sm4,
    counter: Block,
}

impl<'a> Ctr<'a> {
    /// Starts the keystream at `inc32(j0)`.
    pub(crate) fn new(cipher: &'a Sm4, j0: &Block) -> Self {
        let mut counter = *j0;
        inc32(&mut counter);
        Self { cipher, counter }
    }

    /// XORs the keystream into `buffer`, truncating the final block.
    pub(crate) fn apply_keystream(&mut self, buffer: &mut [u8]) {
        let mut keystream = [0u8; BLOCK_SIZE];
        for chunk in buffer.chunks_mut(BLOCK_SIZE) {
            keystream = self.cipher.encrypt_block(&self.counter);
            for (byte, k) in chunk.iter_mut().zip(keystream.iter()) {
                *byte ^= *k;
            }
            inc32(&mut self.counter);
        }
        keystream.zeroize();
    }
}

impl Drop for Ctr<'_> {
    fn drop(&mut self) {
        self.counter.zeroize();
    }
}
