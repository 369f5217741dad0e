//! Fingerprint calculator service.
//!
//! Streams the payload once through a whitespace-stripping filter into the
//! selected digest. The filter removes exactly four byte values — space,
//! carriage return, line feed, horizontal tab — and nothing else; it removes
//! rather than collapses, so `a b` and `ab` fingerprint identically, while a
//! form feed or any other control byte changes the result.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::domain::crypto::{CanonicalFingerprint, HashAlgorithm};
use crate::infra::error::{VeoError, VeoResult};

const READ_BUF_LEN: usize = 8192;

/// The four byte values stripped before hashing. Intentionally narrow: this
/// is not a general whitespace normalization.
#[inline]
#[must_use]
pub fn is_insignificant_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\r' | b'\n' | b'\t')
}

/// Computes canonical fingerprints for one hash algorithm.
pub struct FingerprintCalculator {
    algorithm: HashAlgorithm,
}

impl FingerprintCalculator {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Fingerprint a payload stream in a single linear pass.
    ///
    /// # Errors
    ///
    /// Any read failure is fatal; a digest over a truncated stream is never
    /// returned.
    pub fn fingerprint<R: Read>(&self, mut payload: R) -> VeoResult<CanonicalFingerprint> {
        let mut hasher = Hasher::new(self.algorithm);
        let mut buf = [0u8; READ_BUF_LEN];
        loop {
            let n = payload
                .read(&mut buf)
                .map_err(|e| VeoError::io("fingerprint", 40, format!("error reading input: {e}")))?;
            if n == 0 {
                break;
            }
            // Compact significant bytes to the front of the buffer, then hash
            // the kept prefix in one update. Byte order is preserved.
            let mut kept = 0;
            for i in 0..n {
                let byte = buf[i];
                if !is_insignificant_whitespace(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            hasher.update(&buf[..kept]);
        }
        let digest = hasher.finalize();
        CanonicalFingerprint::new(self.algorithm, &digest)
            .map_err(|e| VeoError::crypto("fingerprint", 41, e.to_string()))
    }

    /// Fingerprint a file by path.
    pub fn fingerprint_file(&self, path: &Path) -> VeoResult<CanonicalFingerprint> {
        let file = File::open(path).map_err(|e| {
            VeoError::resource(
                "fingerprint",
                42,
                format!("cannot open signed object: {e}"),
                path,
            )
        })?;
        self.fingerprint(file)
    }
}

enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(bytes),
            Hasher::Sha256(h) => h.update(bytes),
            Hasher::Sha384(h) => h.update(bytes),
            Hasher::Sha512(h) => h.update(bytes),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Hasher::Sha1(h) => h.finalize().to_vec(),
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha384(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
        FingerprintCalculator::new(algorithm)
            .fingerprint(bytes)
            .unwrap()
            .as_hex()
            .to_string()
    }

    #[test]
    fn whitespace_set_is_exactly_four_bytes() {
        for byte in 0u16..=255 {
            let byte = byte as u8;
            let expected = byte == 0x20 || byte == 0x0D || byte == 0x0A || byte == 0x09;
            assert_eq!(is_insignificant_whitespace(byte), expected, "byte 0x{byte:02X}");
        }
    }

    #[test]
    fn removal_not_collapsing() {
        // "a b" and "ab" canonicalize identically
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, b"a b"),
            hex_of(HashAlgorithm::Sha256, b"ab")
        );
    }

    #[test]
    fn input_larger_than_read_buffer() {
        let big: Vec<u8> = b"x \r\n\t".iter().copied().cycle().take(3 * READ_BUF_LEN + 17).collect();
        let stripped: Vec<u8> = big
            .iter()
            .copied()
            .filter(|&b| !is_insignificant_whitespace(b))
            .collect();
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, &big),
            hex_of(HashAlgorithm::Sha256, &stripped)
        );
    }

    #[test]
    fn empty_input_digests_like_empty_message() {
        // SHA-256 of the empty message
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, b" \r\n\t"),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }
}
