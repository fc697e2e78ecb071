//! Reference SM4 implementation used by the GCM mode crate and the CLI.
//!
//! This crate follows GB/T 32907-2016 and provides:
//! - The 32-round key schedule.
//! - Single-block encryption and decryption.
//! - Key and round-key types that clear themselves on drop.
//!
//! All multi-byte quantities are big-endian. The round function uses a
//! byte-indexed S-box lookup and is therefore not hardened against cache
//! timing side channels.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
mod key;
pub mod round;
mod sbox;

pub use crate::block::{xor_in_place, Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, expand_key, Sm4};
pub use crate::error::Error;
pub use crate::key::{RoundKeys, Sm4Key, KEY_SIZE, ROUNDS};
pub use crate::sbox::sbox;
