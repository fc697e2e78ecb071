//! Errors reported by the block cipher layer.

use thiserror::Error;

/// Failure constructing an SM4 key or cipher from untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The supplied key material was not exactly 16 bytes.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
}
