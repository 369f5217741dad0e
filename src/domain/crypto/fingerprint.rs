//! Canonical fingerprint of a signed object.
//!
//! A fingerprint is the uppercase-hex digest of the payload with the four
//! insignificant whitespace bytes removed before hashing, so two differently
//! formatted copies of the same logical content compare equal.

use std::fmt;

use super::HashAlgorithm;

/// Uppercase-hex digest paired with the algorithm that produced it.
///
/// Invariant: `hex.len() == 2 * algorithm.digest_size()`, charset `0-9A-F`.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalFingerprint {
    algorithm: HashAlgorithm,
    hex: String,
}

impl CanonicalFingerprint {
    /// Wrap a finalized digest. Fails if the digest length does not match
    /// the algorithm.
    pub fn new(algorithm: HashAlgorithm, digest: &[u8]) -> Result<Self, FingerprintError> {
        if digest.len() != algorithm.digest_size() {
            return Err(FingerprintError::LengthMismatch {
                expected: algorithm.digest_size(),
                actual: digest.len(),
            });
        }
        Ok(Self {
            algorithm,
            hex: hex::encode_upper(digest),
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for CanonicalFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl fmt::Debug for CanonicalFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalFingerprint(algo={:?}, {})", self.algorithm, self.hex)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("digest length mismatch (expected {expected}, actual {actual})")]
    LengthMismatch { expected: usize, actual: usize },
}
