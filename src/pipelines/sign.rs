//! `SignWorkflow` orchestrates one complete run.
//!
//! Stages run strictly in order, each completing before the next begins:
//! credential acquisition, container assembly, then an independent
//! fingerprint pass over the same source payload. Any failure aborts the
//! run; there are no retries.

use std::fs::File;
use std::path::PathBuf;

use crate::adapters::pfx::{PfxCredentialStore, SigningCredential};
use crate::adapters::prompt;
use crate::adapters::veo_file::VeoFileBuilder;
use crate::domain::crypto::CanonicalFingerprint;
use crate::infra::config::RunConfig;
use crate::infra::error::{VeoError, VeoResult};
use crate::services::assembler::Assembler;
use crate::services::fingerprint::FingerprintCalculator;

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunSummary {
    /// Where the container was written
    pub veo_path: PathBuf,
    /// Comparable digest of the signed object
    pub fingerprint: CanonicalFingerprint,
}

pub struct SignWorkflow {
    config: RunConfig,
}

impl SignWorkflow {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Acquire the credential, prompting if configuration supplied no secret.
    fn acquire_credential(&self) -> VeoResult<SigningCredential> {
        let secret = match &self.config.secret {
            Some(secret) => secret.clone(),
            None => prompt::prompt_for_secret()?,
        };
        PfxCredentialStore::load(&self.config.pfx_path, &secret)
        // secret dropped (and zeroed) here
    }

    /// Run assembly and fingerprinting. The container is fully written and
    /// closed before the fingerprint pass re-opens the source payload.
    pub fn run(&self) -> VeoResult<RunSummary> {
        let credential = self.acquire_credential()?;

        let target = self.config.target_path();
        let assembler = Assembler::new(self.config.hash_algorithm);
        let mut builder = VeoFileBuilder::new();
        let mut payload = File::open(&self.config.signed_object).map_err(|e| {
            VeoError::resource(
                "sign workflow",
                70,
                format!("cannot open signed object: {e}"),
                &self.config.signed_object,
            )
        })?;
        assembler.assemble(&mut builder, &credential, &mut payload, &target)?;
        drop(payload);

        let calculator = FingerprintCalculator::new(self.config.hash_algorithm);
        let fingerprint = calculator.fingerprint_file(&self.config.signed_object)?;

        Ok(RunSummary {
            veo_path: target,
            fingerprint,
        })
    }
}
