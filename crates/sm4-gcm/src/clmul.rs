//! GHASH multiplication with the x86 carry-less multiply instruction.
//!
//! Field elements are bit-reflected into ordinary polynomial order, multiplied
//! as four 64×64 carry-less products, reduced modulo
//! `x^128 + x^7 + x^2 + x + 1`, and reflected back.

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::{__m128i, _mm_clmulepi64_si128, _mm_set_epi64x, _mm_storeu_si128};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{__m128i, _mm_clmulepi64_si128, _mm_set_epi64x, _mm_storeu_si128};

use zeroize::Zeroize;

/// Returns true when the running CPU has PCLMULQDQ.
pub(crate) fn is_available() -> bool {
    std::is_x86_feature_detected!("pclmulqdq") && std::is_x86_feature_detected!("sse2")
}

/// Hash subkey prepared for carry-less multiplication.
#[derive(Clone)]
pub(crate) struct ClmulKey {
    h: u128,
}

impl ClmulKey {
    /// Returns `None` when the CPU lacks the instructions.
    pub(crate) fn new(h: u128) -> Option<Self> {
        is_available().then(|| Self {
            h: h.reverse_bits(),
        })
    }

    /// Multiplies `x` by the hash subkey.
    #[inline]
    pub(crate) fn mul(&self, x: u128) -> u128 {
        // SAFETY: `new` only builds a key after detecting PCLMULQDQ and SSE2.
        let (hi, lo) = unsafe { clmul128(x.reverse_bits(), self.h) };
        reduce(hi, lo).reverse_bits()
    }
}

impl Drop for ClmulKey {
    fn drop(&mut self) {
        self.h.zeroize();
    }
}

impl core::fmt::Debug for ClmulKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClmulKey").finish_non_exhaustive()
    }
}

#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn clmul64(a: u64, b: u64) -> u128 {
    let product = _mm_clmulepi64_si128(
        _mm_set_epi64x(0, a as i64),
        _mm_set_epi64x(0, b as i64),
        0x00,
    );
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, product);
    u128::from_le_bytes(out)
}

/// Full 256-bit carry-less product as `(high, low)`.
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn clmul128(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = ((a >> 64) as u64, a as u64);
    let (b1, b0) = ((b >> 64) as u64, b as u64);
    let lo = clmul64(a0, b0);
    let hi = clmul64(a1, b1);
    let mid = clmul64(a0, b1) ^ clmul64(a1, b0);
    (hi ^ (mid >> 64), lo ^ (mid << 64))
}

/// Reduces `hi · x^128 + lo` using `x^128 = x^7 + x^2 + x + 1`.
#[inline]
fn reduce(hi: u128, lo: u128) -> u128 {
    // Bits of hi·(x^7 + x^2 + x) that land at or above x^128.
    let spill = (hi >> 127) ^ (hi >> 126) ^ (hi >> 121);
    let folded = hi ^ (hi << 1) ^ (hi << 2) ^ (hi << 7);
    lo ^ folded ^ spill ^ (spill << 1) ^ (spill << 2) ^ (spill << 7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::gf_mul;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn clmul_matches_reference_multiplication() {
        if !is_available() {
            return;
        }
        let mut rng = ChaCha20Rng::from_seed([50u8; 32]);
        for _ in 0..256 {
            let (x, h): (u128, u128) = (rng.gen(), rng.gen());
            let key = ClmulKey::new(h).expect("checked above");
            assert_eq!(key.mul(x), gf_mul(x, h));
        }
    }

    #[test]
    fn reduce_folds_single_high_bit() {
        assert_eq!(reduce(1, 0), 0b1000_0111);
    }
}
