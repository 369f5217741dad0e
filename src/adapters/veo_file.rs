//! On-disk VEO container builder.
//!
//! Writes a VERS-style XML container: header, content signature blocks, lock
//! signature blocks, the raw signed object, footer. Content signatures cover
//! the forthcoming payload, so blocks are held pending and all signatures are
//! finalized at `close()`; the file is only created once every signature is
//! computed, and a failed write removes the target. A builder dropped before
//! `close()` has touched nothing on disk.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Private};
use openssl::sign::Signer;

use crate::adapters::pfx::SigningCredential;
use crate::domain::container::{validate_lock_references, BlockKind, ContainerRuleError, SignatureBlock};
use crate::domain::crypto::HashAlgorithm;
use crate::infra::error::{VeoError, VeoResult};
use crate::services::assembler::ContainerBuilder;

const VERS_NAMESPACE: &str = "http://www.prov.vic.gov.au/gservice/standard/pros99007.htm";
const CONTAINER_VERSION: &str = "2.0";

fn message_digest(algorithm: HashAlgorithm) -> MessageDigest {
    match algorithm {
        HashAlgorithm::Sha1 => MessageDigest::sha1(),
        HashAlgorithm::Sha256 => MessageDigest::sha256(),
        HashAlgorithm::Sha384 => MessageDigest::sha384(),
        HashAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

/// Algorithm identifier as written into the container, e.g. `SHA256withRSA`
fn signature_algorithm_name(algorithm: HashAlgorithm, key: &PKey<Private>) -> String {
    let key_name = match key.id() {
        Id::EC => "ECDSA",
        Id::DSA => "DSA",
        _ => "RSA",
    };
    format!("{}with{}", algorithm.as_str(), key_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Open,
    PayloadAppended,
    Closed,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Open => "open",
            State::PayloadAppended => "payload appended",
            State::Closed => "closed",
        }
    }
}

struct PendingBlock {
    index: u32,
    kind: BlockKind,
    algorithm: HashAlgorithm,
    pkey: PKey<Private>,
    chain_der: Vec<Vec<u8>>,
}

/// Concrete [`ContainerBuilder`] producing a `.veo` file.
pub struct VeoFileBuilder {
    state: State,
    target: Option<PathBuf>,
    pending: Vec<PendingBlock>,
    content_blocks: u32,
    lock_blocks: u32,
    payload: Vec<u8>,
}

impl VeoFileBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            target: None,
            pending: Vec::new(),
            content_blocks: 0,
            lock_blocks: 0,
            payload: Vec::new(),
        }
    }

    fn expect_state(&self, step: &'static str, expected: State) -> VeoResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ContainerRuleError::OutOfSequence {
                step,
                state: self.state.name(),
            }
            .into())
        }
    }

    /// Finalize every pending signature. Content blocks sign the payload;
    /// lock blocks sign the base64 signature values of the content blocks
    /// they reference, in reference order.
    fn finalize_blocks(&self) -> VeoResult<Vec<SignatureBlock>> {
        let mut blocks: Vec<SignatureBlock> = Vec::with_capacity(self.pending.len());
        for pending in &self.pending {
            let signature = match &pending.kind {
                BlockKind::Content => {
                    sign_bytes(&pending.pkey, pending.algorithm, &self.payload)?
                }
                BlockKind::Lock { references } => {
                    let mut anchored = String::new();
                    for &reference in references {
                        let content = blocks
                            .iter()
                            .find(|b| b.index() == reference && *b.kind() == BlockKind::Content)
                            .ok_or(ContainerRuleError::UnknownReference {
                                index: reference,
                                content_blocks: self.content_blocks,
                            })?;
                        anchored.push_str(&BASE64.encode(content.signature()));
                    }
                    sign_bytes(&pending.pkey, pending.algorithm, anchored.as_bytes())?
                }
            };
            blocks.push(SignatureBlock::new(
                pending.index,
                pending.kind.clone(),
                pending.algorithm,
                signature,
                pending.chain_der.clone(),
            ));
        }
        Ok(blocks)
    }

    fn write_container(&self, target: &Path, blocks: &[SignatureBlock]) -> VeoResult<()> {
        let file = File::create(target).map_err(|e| {
            VeoError::resource(
                "container builder",
                31,
                format!("cannot create container: {e}"),
                target,
            )
        })?;
        let mut out = BufWriter::new(file);
        self.render(&mut out, blocks)
            .and_then(|()| out.flush().map_err(VeoError::from))
            .map_err(|e| {
                // Never leave a half-written container behind
                drop(fs::remove_file(target));
                e
            })
    }

    fn render<W: Write>(&self, out: &mut W, blocks: &[SignatureBlock]) -> VeoResult<()> {
        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            out,
            "<vers:VERSEncapsulatedObject xmlns:vers=\"{VERS_NAMESPACE}\">"
        )?;
        writeln!(out, "<vers:Version>{CONTAINER_VERSION}</vers:Version>")?;
        for block in blocks {
            self.render_block(out, block)?;
        }
        writeln!(out, "<vers:SignedObject vers:VEOVersion=\"{CONTAINER_VERSION}\">")?;
        out.write_all(&self.payload)?;
        writeln!(out, "\n</vers:SignedObject>")?;
        writeln!(out, "</vers:VERSEncapsulatedObject>")?;
        Ok(())
    }

    fn render_block<W: Write>(&self, out: &mut W, block: &SignatureBlock) -> VeoResult<()> {
        let pending = &self.pending[(block.index() - 1) as usize];
        let algorithm_name = signature_algorithm_name(block.algorithm(), &pending.pkey);
        match block.kind() {
            BlockKind::Content => {
                writeln!(
                    out,
                    "<vers:SignatureBlock vers:id=\"Signature-{}\">",
                    block.index()
                )?;
            }
            BlockKind::Lock { references } => {
                let refs = references
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(
                    out,
                    "<vers:LockSignatureBlock vers:id=\"LockSignature-{}\" vers:signsSignatureBlock=\"{refs}\">",
                    block.index()
                )?;
            }
        }
        writeln!(out, "<vers:SignatureAlgorithm>")?;
        writeln!(
            out,
            "<vers:SignatureAlgorithmIdentifier>{algorithm_name}</vers:SignatureAlgorithmIdentifier>"
        )?;
        writeln!(out, "</vers:SignatureAlgorithm>")?;
        writeln!(out, "<vers:Signature>")?;
        writeln!(out, "{}", BASE64.encode(block.signature()))?;
        writeln!(out, "</vers:Signature>")?;
        writeln!(out, "<vers:CertificateBlock>")?;
        for cert in block.certificate_chain() {
            writeln!(out, "<vers:Certificate>")?;
            writeln!(out, "{}", BASE64.encode(cert))?;
            writeln!(out, "</vers:Certificate>")?;
        }
        writeln!(out, "</vers:CertificateBlock>")?;
        match block.kind() {
            BlockKind::Content => writeln!(out, "</vers:SignatureBlock>")?,
            BlockKind::Lock { .. } => writeln!(out, "</vers:LockSignatureBlock>")?,
        }
        Ok(())
    }
}

impl Default for VeoFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder for VeoFileBuilder {
    fn open(&mut self, target: &Path) -> VeoResult<()> {
        self.expect_state("open", State::Idle)?;
        log::debug!("container target: {}", target.display());
        self.target = Some(target.to_path_buf());
        self.state = State::Open;
        Ok(())
    }

    fn append_content_signature(
        &mut self,
        credential: &SigningCredential,
        algorithm: HashAlgorithm,
    ) -> VeoResult<u32> {
        self.expect_state("append content signature", State::Open)?;
        if self.lock_blocks > 0 {
            return Err(ContainerRuleError::OutOfSequence {
                step: "append content signature",
                state: "lock signatures appended",
            }
            .into());
        }
        let index = self.content_blocks + 1;
        self.pending.push(PendingBlock {
            index,
            kind: BlockKind::Content,
            algorithm,
            pkey: credential.private_key().clone(),
            chain_der: credential.certificate_chain_der()?,
        });
        self.content_blocks = index;
        Ok(index)
    }

    fn append_lock_signature(
        &mut self,
        credential: &SigningCredential,
        algorithm: HashAlgorithm,
        references: &[u32],
    ) -> VeoResult<()> {
        self.expect_state("append lock signature", State::Open)?;
        validate_lock_references(references, self.content_blocks)?;
        self.pending.push(PendingBlock {
            index: self.content_blocks + self.lock_blocks + 1,
            kind: BlockKind::Lock {
                references: references.to_vec(),
            },
            algorithm,
            pkey: credential.private_key().clone(),
            chain_der: credential.certificate_chain_der()?,
        });
        self.lock_blocks += 1;
        Ok(())
    }

    fn append_payload(&mut self, payload: &mut dyn Read) -> VeoResult<()> {
        self.expect_state("append payload", State::Open)?;
        if self.content_blocks == 0 {
            return Err(ContainerRuleError::NoContentBlocks.into());
        }
        payload.read_to_end(&mut self.payload).map_err(|e| {
            VeoError::io(
                "container builder",
                32,
                format!("error reading signed object: {e}"),
            )
        })?;
        self.state = State::PayloadAppended;
        Ok(())
    }

    fn close(&mut self) -> VeoResult<()> {
        self.expect_state("close", State::PayloadAppended)?;
        if self.lock_blocks == 0 {
            return Err(ContainerRuleError::NoLockBlocks.into());
        }
        let target = self
            .target
            .clone()
            .ok_or(ContainerRuleError::OutOfSequence {
                step: "close",
                state: "no target",
            })?;
        let blocks = self.finalize_blocks()?;
        self.write_container(&target, &blocks)?;
        self.state = State::Closed;
        Ok(())
    }
}

fn sign_bytes(
    pkey: &PKey<Private>,
    algorithm: HashAlgorithm,
    bytes: &[u8],
) -> VeoResult<Vec<u8>> {
    let mut signer = Signer::new(message_digest(algorithm), pkey).map_err(|e| {
        VeoError::crypto(
            "container builder",
            33,
            format!("cannot initialize {algorithm} signer: {e}"),
        )
    })?;
    signer
        .update(bytes)
        .and_then(|()| signer.sign_to_vec())
        .map_err(|e| VeoError::crypto("container builder", 34, format!("signing failed: {e}")))
}
