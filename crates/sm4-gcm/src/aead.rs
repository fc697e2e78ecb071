//! SM4-GCM sessions and one-shot helpers.

use sm4_core::{xor_in_place, Block, Sm4, Sm4Key, BLOCK_SIZE};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroize;

use crate::counter::{bit_len, derive_j0, Ctr};
use crate::error::Error;
use crate::ghash::GaloisHasher;

/// Nonce length taking the direct `J0 = nonce || 1` path.
pub const NONCE_SIZE: usize = 12;

/// Length of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Longest message one nonce may protect: 2^32 - 2 counter blocks.
pub const MAX_PLAINTEXT_LEN: u64 = ((1u64 << 32) - 2) * BLOCK_SIZE as u64;

/// Authentication tag.
pub type Tag = [u8; TAG_SIZE];

/// SM4-GCM session bound to one key.
///
/// Construction derives the round keys, the hash subkey `H = E_K(0^128)` and
/// the GHASH multiplication table; every later call only reads them.
#[derive(Clone, Debug)]
pub struct Sm4Gcm {
    cipher: Sm4,
    ghash: GaloisHasher,
}

impl Sm4Gcm {
    /// Creates a session for `key`.
    pub fn new(key: &Sm4Key) -> Self {
        let cipher = Sm4::new(key);
        let mut h = cipher.encrypt_block(&[0u8; BLOCK_SIZE]);
        let ghash = GaloisHasher::new(&h);
        h.zeroize();
        debug!(backend = ghash.backend_name(), "sm4-gcm session initialized");
        Self { cipher, ghash }
    }

    /// Creates a session from raw key bytes, which must be exactly 16 bytes.
    pub fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        let key = Sm4Key::try_from(key)?;
        Ok(Self::new(&key))
    }

    /// Encrypts `buffer` in place and returns the tag over `aad` and the
    /// ciphertext.
    pub fn encrypt_in_place_detached(
        &self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> Result<Tag, Error> {
        let j0 = self.prepare(nonce, buffer.len())?;
        Ctr::new(&self.cipher, &j0).apply_keystream(buffer);
        Ok(self.compute_tag(&j0, aad, buffer))
    }

    /// Verifies `tag` and, only if it matches, decrypts `buffer` in place.
    ///
    /// On [`Error::AuthenticationFailure`] the buffer still holds the
    /// ciphertext.
    pub fn decrypt_in_place_detached(
        &self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &Tag,
    ) -> Result<(), Error> {
        let j0 = self.prepare(nonce, buffer.len())?;

        let mut expected = self.compute_tag(&j0, aad, buffer);
        let matches: bool = expected[..].ct_eq(&tag[..]).into();
        expected.zeroize();
        if !matches {
            debug!(
                aad_len = aad.len(),
                ciphertext_len = buffer.len(),
                "sm4-gcm tag verification failed"
            );
            return Err(Error::AuthenticationFailure);
        }

        Ctr::new(&self.cipher, &j0).apply_keystream(buffer);
        Ok(())
    }

    /// Encrypts `plaintext`, returning the ciphertext and tag separately.
    pub fn encrypt(
        &self,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Tag), Error> {
        let mut buffer = plaintext.to_vec();
        let tag = self.encrypt_in_place_detached(nonce, aad, &mut buffer)?;
        Ok((buffer, tag))
    }

    /// Verifies and decrypts a detached ciphertext and tag.
    pub fn decrypt(
        &self,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &Tag,
    ) -> Result<Vec<u8>, Error> {
        let mut buffer = ciphertext.to_vec();
        self.decrypt_in_place_detached(nonce, aad, &mut buffer, tag)?;
        Ok(buffer)
    }

    /// Encrypts `plaintext` and returns `ciphertext || tag`.
    pub fn seal(&self, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::with_capacity(plaintext.len() + TAG_SIZE);
        buffer.extend_from_slice(plaintext);
        let tag = self.encrypt_in_place_detached(nonce, aad, &mut buffer)?;
        buffer.extend_from_slice(&tag);
        Ok(buffer)
    }

    /// Opens `ciphertext || tag` produced by [`Sm4Gcm::seal`].
    pub fn open(&self, nonce: &[u8], aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
        let split = sealed
            .len()
            .checked_sub(TAG_SIZE)
            .ok_or(Error::AuthenticationFailure)?;
        let (ciphertext, tag) = sealed.split_at(split);
        let tag: &Tag = tag.try_into().map_err(|_| Error::AuthenticationFailure)?;
        self.decrypt(nonce, aad, ciphertext, tag)
    }

    fn prepare(&self, nonce: &[u8], len: usize) -> Result<Block, Error> {
        check_message_len(len as u64)?;
        derive_j0(&self.ghash, nonce)
    }

    /// `GHASH(aad || ciphertext || lengths) XOR E_K(J0)`.
    fn compute_tag(&self, j0: &Block, aad: &[u8], ciphertext: &[u8]) -> Tag {
        let mut ghash = self.ghash.start();
        ghash.update_padded(aad);
        ghash.update_padded(ciphertext);
        ghash.update_lengths(bit_len(aad.len()), bit_len(ciphertext.len()));
        let mut tag = ghash.finalize();

        let mut ek_j0 = self.cipher.encrypt_block(j0);
        xor_in_place(&mut tag, &ek_j0);
        ek_j0.zeroize();
        tag
    }
}

fn check_message_len(len: u64) -> Result<(), Error> {
    if len > MAX_PLAINTEXT_LEN {
        return Err(Error::MessageTooLong {
            len,
            max: MAX_PLAINTEXT_LEN,
        });
    }
    Ok(())
}

/// Encrypts `plaintext` under a raw 16-byte key.
///
/// Builds a fresh session per call; hold an [`Sm4Gcm`] instead when
/// encrypting several messages under one key.
pub fn encrypt(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Tag), Error> {
    Sm4Gcm::new_from_slice(key)?.encrypt(nonce, aad, plaintext)
}

/// Verifies and decrypts under a raw 16-byte key. No plaintext is returned
/// unless the tag matches.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &Tag,
) -> Result<Vec<u8>, Error> {
    Sm4Gcm::new_from_slice(key)?.decrypt(nonce, aad, ciphertext, tag)
}
