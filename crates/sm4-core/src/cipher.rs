//! SM4 key schedule and block encryption/decryption.

use zeroize::Zeroize;

use crate::block::{load_words, store_words, Block};
use crate::error::Error;
use crate::key::{RoundKeys, Sm4Key, ROUNDS};
use crate::round::{t, t_prime};

/// System parameter FK.
const FK: [u32; 4] = [0xa3b1_bac6, 0x56aa_3350, 0x677d_9197, 0xb270_22dc];

/// Fixed parameter CK: byte `j` of `CK[i]` is `(4i + j) * 7 mod 256`.
const CK: [u32; ROUNDS] = ck_table();

const fn ck_table() -> [u32; ROUNDS] {
    let mut ck = [0u32; ROUNDS];
    let mut i = 0;
    while i < ROUNDS {
        let mut word = 0u32;
        let mut j = 0;
        while j < 4 {
            let byte = (((4 * i + j) * 7) % 256) as u32;
            word = (word << 8) | byte;
            j += 1;
        }
        ck[i] = word;
        i += 1;
    }
    ck
}

/// Expands a 128-bit key into 32 round keys.
pub fn expand_key(key: &Sm4Key) -> RoundKeys {
    let mk = load_words(key.as_bytes());
    let mut k = [mk[0] ^ FK[0], mk[1] ^ FK[1], mk[2] ^ FK[2], mk[3] ^ FK[3]];

    let mut rk = [0u32; ROUNDS];
    for (i, slot) in rk.iter_mut().enumerate() {
        let next = k[0] ^ t_prime(k[1] ^ k[2] ^ k[3] ^ CK[i]);
        k = [k[1], k[2], k[3], next];
        *slot = next;
    }

    let schedule = RoundKeys(rk);
    k.zeroize();
    schedule
}

/// Runs the 32 rounds with subkeys taken in the given order and applies the
/// final reverse transform.
#[inline]
fn crypt<I>(block: &Block, subkeys: I) -> Block
where
    I: Iterator<Item = u32>,
{
    let mut x = load_words(block);
    for rk in subkeys {
        let next = x[0] ^ t(x[1] ^ x[2] ^ x[3] ^ rk);
        x = [x[1], x[2], x[3], next];
    }
    x.reverse();
    store_words(&x)
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    crypt(block, round_keys.0.iter().copied())
}

/// Decrypts a single 16-byte block with pre-expanded round keys.
///
/// Same rounds as encryption, subkeys applied from round 31 down to 0.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    crypt(block, round_keys.0.iter().rev().copied())
}

/// SM4 cipher instance owning its expanded key schedule.
#[derive(Clone, Debug)]
pub struct Sm4 {
    round_keys: RoundKeys,
}

impl Sm4 {
    /// Expands `key` into a new cipher instance.
    pub fn new(key: &Sm4Key) -> Self {
        Self {
            round_keys: expand_key(key),
        }
    }

    /// Builds a cipher from raw key bytes, which must be exactly 16 bytes long.
    pub fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        let key = Sm4Key::try_from(key)?;
        Ok(Self::new(&key))
    }

    /// Encrypts one block.
    #[inline]
    pub fn encrypt_block(&self, block: &Block) -> Block {
        encrypt_block(block, &self.round_keys)
    }

    /// Encrypts one block in place.
    #[inline]
    pub fn encrypt_block_in_place(&self, block: &mut Block) {
        *block = encrypt_block(block, &self.round_keys);
    }

    /// Decrypts one block.
    #[inline]
    pub fn decrypt_block(&self, block: &Block) -> Block {
        decrypt_block(block, &self.round_keys)
    }

    /// Returns the expanded schedule.
    pub fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }
}
