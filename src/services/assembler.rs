//! Assembler: drives a container builder through the mandatory block
//! sequence.
//!
//! The sequence is fixed and order-sensitive: open, one content signature,
//! one lock signature referencing it, the raw payload, close. Any failing
//! step aborts the whole assembly; the builder is responsible for not
//! leaving a partially written target behind.

use std::io::Read;
use std::path::Path;

use crate::adapters::pfx::SigningCredential;
use crate::domain::crypto::HashAlgorithm;
use crate::infra::error::VeoResult;

/// Container builder collaborator interface.
///
/// Implementations own the on-disk format. The assembler only guarantees
/// call order; implementations enforce the container invariants (content
/// blocks before lock blocks, valid lock references, no partial output).
pub trait ContainerBuilder {
    /// Open an empty container addressed to `target`.
    fn open(&mut self, target: &Path) -> VeoResult<()>;

    /// Append a content signature block covering the forthcoming payload.
    /// Returns the 1-based index assigned to the block.
    fn append_content_signature(
        &mut self,
        credential: &SigningCredential,
        algorithm: HashAlgorithm,
    ) -> VeoResult<u32>;

    /// Append a lock signature block over the signature values of the
    /// referenced content blocks. Every reference must name a content block
    /// that was already appended.
    fn append_lock_signature(
        &mut self,
        credential: &SigningCredential,
        algorithm: HashAlgorithm,
        references: &[u32],
    ) -> VeoResult<()>;

    /// Append the raw payload bytes, unmodified.
    fn append_payload(&mut self, payload: &mut dyn Read) -> VeoResult<()>;

    /// Finalize signatures and write the container out.
    fn close(&mut self) -> VeoResult<()>;
}

/// Drives a [`ContainerBuilder`] through the fixed VEO block sequence.
pub struct Assembler {
    algorithm: HashAlgorithm,
}

impl Assembler {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Assemble one container at `target` from `payload`, signed with
    /// `credential`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; no partial container is
    /// treated as valid.
    pub fn assemble<B: ContainerBuilder>(
        &self,
        builder: &mut B,
        credential: &SigningCredential,
        payload: &mut dyn Read,
        target: &Path,
    ) -> VeoResult<()> {
        log::debug!("assembling container at {}", target.display());
        builder.open(target)?;
        let content_index = builder.append_content_signature(credential, self.algorithm)?;
        log::debug!("content signature appended as block {content_index}");
        builder.append_lock_signature(credential, self.algorithm, &[content_index])?;
        builder.append_payload(payload)?;
        builder.close()?;
        log::info!("container written: {}", target.display());
        Ok(())
    }
}
