//! Reference arithmetic in GF(2^128) with GCM's bit ordering.
//!
//! A 16-byte block is read as a big-endian `u128`; the most significant bit
//! is the coefficient of `x^0`. Multiplying by `x` is therefore a right shift,
//! folding the bit that falls off back in through `R = 0xE1 || 0^120`
//! (the polynomial `x^128 + x^7 + x^2 + x + 1`).
//!
//! These routines are bit-serial and only serve as the baseline the table
//! driven [`GaloisHasher`](crate::GaloisHasher) is checked against.

use sm4_core::Block;

/// Reduction constant for a right shift that overflows past `x^127`.
pub const R: u128 = 0xe1 << 120;

/// Multiplies a field element by `x`.
#[inline]
pub fn mul_x(v: u128) -> u128 {
    if v & 1 == 1 {
        (v >> 1) ^ R
    } else {
        v >> 1
    }
}

/// Multiplies two field elements one bit at a time.
pub fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in (0..128).rev() {
        if (x >> i) & 1 == 1 {
            z ^= v;
        }
        v = mul_x(v);
    }
    z
}

/// Reads a block as a field element.
#[inline]
pub fn from_block(block: &Block) -> u128 {
    u128::from_be_bytes(*block)
}

/// Writes a field element as a block.
#[inline]
pub fn to_block(v: u128) -> Block {
    v.to_be_bytes()
}
