//! PKCS#12 credential store.
//!
//! Loads a signer's private key and certificate chain from a PFX file,
//! unlocked by a secret. The credential lives for one run; the secret is
//! zeroed when the caller drops it.

use std::fmt;
use std::fs;
use std::path::Path;

use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;

use crate::domain::types::CredentialSecret;
use crate::infra::error::{VeoError, VeoResult};

/// A signer's unlocked private key and certificate chain.
pub struct SigningCredential {
    pkey: PKey<Private>,
    certificate: X509,
    chain: Vec<X509>,
}

impl SigningCredential {
    #[must_use]
    pub fn new(pkey: PKey<Private>, certificate: X509, chain: Vec<X509>) -> Self {
        Self {
            pkey,
            certificate,
            chain,
        }
    }

    #[must_use]
    pub fn private_key(&self) -> &PKey<Private> {
        &self.pkey
    }

    #[must_use]
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// Intermediate certificates, if the PFX carried any
    #[must_use]
    pub fn chain(&self) -> &[X509] {
        &self.chain
    }

    /// DER encoding of the full chain, end-entity certificate first.
    pub fn certificate_chain_der(&self) -> VeoResult<Vec<Vec<u8>>> {
        let mut ders = Vec::with_capacity(1 + self.chain.len());
        ders.push(self.certificate.to_der()?);
        for cert in &self.chain {
            ders.push(cert.to_der()?);
        }
        Ok(ders)
    }

    /// CN of the signing certificate, for diagnostics
    #[must_use]
    pub fn subject_common_name(&self) -> Option<String> {
        self.certificate
            .subject_name()
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .and_then(|entry| entry.data().as_utf8().ok())
            .map(|cn| cn.to_string())
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SigningCredential(subject={:?}, chain_len={}, key=[REDACTED])",
            self.subject_common_name(),
            self.chain.len()
        )
    }
}

/// Loads [`SigningCredential`]s from PKCS#12 files.
pub struct PfxCredentialStore;

impl PfxCredentialStore {
    /// Load and unlock a credential.
    ///
    /// # Errors
    ///
    /// Resource error if the file cannot be read; crypto error if the
    /// PKCS#12 structure cannot be parsed or the secret does not unlock it.
    pub fn load(path: &Path, secret: &CredentialSecret) -> VeoResult<SigningCredential> {
        let der = fs::read(path).map_err(|e| {
            VeoError::resource(
                "credential store",
                50,
                format!("cannot read PFX file: {e}"),
                path,
            )
        })?;
        let pkcs12 = Pkcs12::from_der(&der).map_err(|e| {
            VeoError::crypto("credential store", 51, format!("not a PKCS#12 file: {e}"))
        })?;
        let parsed = pkcs12.parse2(secret.as_str()).map_err(|e| {
            VeoError::crypto(
                "credential store",
                52,
                format!("cannot unlock PFX file (wrong password?): {e}"),
            )
        })?;
        let pkey = parsed.pkey.ok_or_else(|| {
            VeoError::crypto("credential store", 53, "PFX file contains no private key")
        })?;
        let certificate = parsed.cert.ok_or_else(|| {
            VeoError::crypto("credential store", 54, "PFX file contains no certificate")
        })?;
        let chain = parsed
            .ca
            .map(|stack| stack.into_iter().collect())
            .unwrap_or_default();

        let credential = SigningCredential::new(pkey, certificate, chain);
        log::debug!("credential loaded: {credential:?}");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::hash::MessageDigest;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509Builder, X509NameBuilder};

    fn self_signed() -> (PKey<Private>, X509) {
        let rsa = Rsa::generate(2048).unwrap();
        let pkey = PKey::from_rsa(rsa).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "veo test signer").unwrap();
        let name = name.build();
        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&pkey).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        builder.sign(&pkey, MessageDigest::sha256()).unwrap();
        (pkey, builder.build())
    }

    #[test]
    fn load_roundtrip_through_pkcs12() {
        let (pkey, cert) = self_signed();
        let pkcs12 = Pkcs12::builder()
            .name("test")
            .pkey(&pkey)
            .cert(&cert)
            .build2("pass")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let pfx_path = dir.path().join("signer.pfx");
        fs::write(&pfx_path, pkcs12.to_der().unwrap()).unwrap();

        let secret = CredentialSecret::new("pass").unwrap();
        let credential = PfxCredentialStore::load(&pfx_path, &secret).unwrap();
        assert_eq!(
            credential.subject_common_name().as_deref(),
            Some("veo test signer")
        );
        assert_eq!(credential.certificate_chain_der().unwrap().len(), 1);
    }

    #[test]
    fn wrong_secret_is_a_crypto_error() {
        let (pkey, cert) = self_signed();
        let pkcs12 = Pkcs12::builder()
            .name("test")
            .pkey(&pkey)
            .cert(&cert)
            .build2("pass")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let pfx_path = dir.path().join("signer.pfx");
        fs::write(&pfx_path, pkcs12.to_der().unwrap()).unwrap();

        let secret = CredentialSecret::new("nope").unwrap();
        let err = PfxCredentialStore::load(&pfx_path, &secret).unwrap_err();
        assert!(matches!(err, VeoError::Crypto { .. }));
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let secret = CredentialSecret::new("pass").unwrap();
        let err =
            PfxCredentialStore::load(Path::new("/nonexistent/signer.pfx"), &secret).unwrap_err();
        assert!(matches!(err, VeoError::Resource { .. }));
    }
}
