//! SM4 round transformations.
//!
//! `t` drives the encryption rounds and `t_prime` the key schedule. Both are a
//! byte-wise S-box substitution (`tau`) followed by a linear diffusion layer.

use crate::sbox::sbox;

/// Applies the S-box independently to each byte of `word`.
#[inline]
pub fn tau(word: u32) -> u32 {
    let [b0, b1, b2, b3] = word.to_be_bytes();
    u32::from_be_bytes([sbox(b0), sbox(b1), sbox(b2), sbox(b3)])
}

/// Diffusion layer of the data path.
#[inline]
pub fn l(word: u32) -> u32 {
    word ^ word.rotate_left(2) ^ word.rotate_left(10) ^ word.rotate_left(18) ^ word.rotate_left(24)
}

/// Diffusion layer of the key schedule.
#[inline]
pub fn l_prime(word: u32) -> u32 {
    word ^ word.rotate_left(13) ^ word.rotate_left(23)
}

/// Composite round transform `L ∘ τ`.
#[inline]
pub fn t(word: u32) -> u32 {
    l(tau(word))
}

/// Composite key-schedule transform `L' ∘ τ`.
#[inline]
pub fn t_prime(word: u32) -> u32 {
    l_prime(tau(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tau_substitutes_every_byte() {
        assert_eq!(tau(0x0000_0000), 0xd6d6_d6d6);
        assert_eq!(tau(0x0001_00ff), 0xd690_d648);
    }

    #[test]
    fn diffusion_layers_are_linear() {
        let a = 0x1234_5678;
        let b = 0x9abc_def0;
        assert_eq!(l(a ^ b), l(a) ^ l(b));
        assert_eq!(l_prime(a ^ b), l_prime(a) ^ l_prime(b));
        assert_eq!(l(0), 0);
        assert_eq!(l_prime(0), 0);
    }

    #[test]
    fn diffusion_of_single_bit() {
        // Bit 0 lands at positions 0, 2, 10, 18 and 24.
        assert_eq!(l(1), 1 | (1 << 2) | (1 << 10) | (1 << 18) | (1 << 24));
        assert_eq!(l_prime(1), 1 | (1 << 13) | (1 << 23));
    }
}
