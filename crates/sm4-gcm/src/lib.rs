//! SM4 in Galois/Counter Mode.
//!
//! The crate pairs the [`sm4_core`] block cipher with counter-mode encryption
//! and a GHASH universal hash over GF(2^128), producing a 16-byte tag.
//! Decryption verifies the tag in constant time before releasing any
//! plaintext.
//!
//! [`Sm4Gcm`] is the per-key session: it owns the round keys, the hash subkey
//! and the 64 KiB GHASH multiplication table, so build it once per key and
//! reuse it across messages. Sessions share no mutable state and may be used
//! from several threads at once.
//!
//! # Nonce reuse
//!
//! A (key, nonce) pair must never encrypt two different messages. Reuse
//! reveals the XOR of the plaintexts and lets an attacker forge tags. This is
//! a contract on the caller; nothing here tracks used nonces.

#![cfg_attr(not(feature = "clmul"), forbid(unsafe_code))]
#![cfg_attr(feature = "clmul", deny(unsafe_code))]
#![deny(missing_docs)]

mod aead;
#[cfg(all(feature = "clmul", any(target_arch = "x86", target_arch = "x86_64")))]
mod clmul;
mod counter;
mod error;
pub mod field;
mod ghash;

pub use crate::aead::{
    decrypt, encrypt, Sm4Gcm, Tag, MAX_PLAINTEXT_LEN, NONCE_SIZE, TAG_SIZE,
};
pub use crate::error::Error;
pub use crate::ghash::{GHash, GaloisHasher, MulTable};
pub use sm4_core::{Block, Sm4Key, BLOCK_SIZE, KEY_SIZE};
