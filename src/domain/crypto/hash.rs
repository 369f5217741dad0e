//! Hash algorithm domain type.
//!
//! The VERS algorithm set: SHA1 for legacy vendor containers, SHA256 and up
//! for current ones. Unknown names are rejected when configuration is
//! resolved, before any payload byte is read.

use std::fmt;
use std::str::FromStr;

use crate::infra::error::{VeoError, VeoResult};

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Canonical name as it appears in VEO signature blocks
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes
    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = VeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_algorithm(s)
    }
}

fn parse_algorithm(s: &str) -> VeoResult<HashAlgorithm> {
    match s.to_ascii_uppercase().replace('-', "").as_str() {
        "SHA1" => Ok(HashAlgorithm::Sha1),
        "SHA256" => Ok(HashAlgorithm::Sha256),
        "SHA384" => Ok(HashAlgorithm::Sha384),
        "SHA512" => Ok(HashAlgorithm::Sha512),
        _ => Err(VeoError::configuration(
            "hash",
            10,
            format!("unknown hash algorithm '{s}' (expected SHA1, SHA256, SHA384 or SHA512)"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algorithm_properties() {
        assert_eq!(HashAlgorithm::Sha1.as_str(), "SHA1");
        assert_eq!(HashAlgorithm::Sha1.digest_size(), 20);

        assert_eq!(HashAlgorithm::Sha256.as_str(), "SHA256");
        assert_eq!(HashAlgorithm::Sha256.digest_size(), 32);

        assert_eq!(HashAlgorithm::Sha384.as_str(), "SHA384");
        assert_eq!(HashAlgorithm::Sha384.digest_size(), 48);

        assert_eq!(HashAlgorithm::Sha512.as_str(), "SHA512");
        assert_eq!(HashAlgorithm::Sha512.digest_size(), 64);
    }

    #[test]
    fn test_parse_accepts_common_spellings() {
        for spelling in ["sha256", "SHA256", "Sha-256", "sha-256"] {
            assert_eq!(
                spelling.parse::<HashAlgorithm>().unwrap(),
                HashAlgorithm::Sha256,
                "spelling should parse: {spelling}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "md5".parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, VeoError::Configuration { .. }));
        assert_eq!(err.component(), "hash");
    }
}
