//! Errors reported by the AEAD layer.

use thiserror::Error;

/// Failure of an SM4-GCM operation.
///
/// [`Error::AuthenticationFailure`] deliberately carries no detail about the
/// mismatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The key was not exactly 16 bytes.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
    /// The nonce was empty.
    #[error("nonce must be at least one byte long")]
    InvalidNonceLength,
    /// The message needs more counter blocks than one nonce provides.
    #[error("message of {len} bytes exceeds the {max}-byte limit for a single nonce")]
    MessageTooLong {
        /// Message length in bytes.
        len: u64,
        /// Largest permitted length in bytes.
        max: u64,
    },
    /// The tag did not match the ciphertext and associated data.
    #[error("authentication failed")]
    AuthenticationFailure,
}

impl From<sm4_core::Error> for Error {
    fn from(err: sm4_core::Error) -> Self {
        match err {
            sm4_core::Error::InvalidKeyLength { expected, actual } => {
                Self::InvalidKeyLength { expected, actual }
            }
        }
    }
}
