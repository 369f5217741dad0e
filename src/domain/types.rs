//! Type-safe wrappers for sensitive inputs.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::infra::error::{VeoError, VeoResult};

/// Upper bound on a credential secret, in bytes. A misbehaving input source
/// must not cause unbounded buffering.
pub const MAX_SECRET_LEN: usize = 1024;

/// The secret that unlocks a PKCS#12 credential file.
///
/// Never printed: `Display` and `Debug` are redacted, and the backing memory
/// is zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialSecret(String);

impl CredentialSecret {
    /// Create a secret after length validation (`MAX_SECRET_LEN` bytes).
    pub fn new(secret: impl Into<String>) -> VeoResult<Self> {
        let secret = secret.into();
        if secret.len() > MAX_SECRET_LEN {
            return Err(VeoError::configuration(
                "secret",
                20,
                format!(
                    "credential secret too long: {} bytes (maximum {MAX_SECRET_LEN})",
                    secret.len()
                ),
            ));
        }
        Ok(CredentialSecret(secret))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[SECRET REDACTED]")
    }
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialSecret([SECRET REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_roundtrip() {
        let secret = CredentialSecret::new("pass").unwrap();
        assert_eq!(secret.as_str(), "pass");
    }

    #[test]
    fn test_empty_secret_is_allowed() {
        // Some vendor PFX files genuinely have an empty password
        assert!(CredentialSecret::new("").is_ok());
    }

    #[test]
    fn test_secret_over_limit_is_rejected() {
        let err = CredentialSecret::new("x".repeat(MAX_SECRET_LEN + 1)).unwrap_err();
        assert!(matches!(err, VeoError::Configuration { .. }));
        assert_eq!(err.component(), "secret");
    }

    #[test]
    fn test_secret_display_is_redacted() {
        let secret = CredentialSecret::new("hunter2").unwrap();
        assert_eq!(secret.to_string(), "[SECRET REDACTED]");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }
}
