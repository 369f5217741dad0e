//! VEO Signer Library
//!
//! Rebuilds a signed VERS VEO container from a raw signed-object fragment
//! and a PKCS#12 credential, so an archival authority can compare the result
//! byte-for-byte against a vendor-supplied container. Also computes the
//! canonical whitespace-insensitive fingerprint used to compare signed
//! objects across incidental reformatting.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use adapters::pfx::{PfxCredentialStore, SigningCredential};
pub use adapters::prompt::{prompt_for_secret, read_masked_secret};
pub use adapters::veo_file::VeoFileBuilder;
pub use domain::container::{BlockKind, ContainerRuleError, SignatureBlock};
pub use domain::crypto::{CanonicalFingerprint, HashAlgorithm};
pub use domain::types::{CredentialSecret, MAX_SECRET_LEN};
pub use infra::config::{load_defaults, CliArgs, RunConfig, SignerDefaults};
pub use infra::error::{VeoError, VeoResult};
pub use pipelines::sign::{RunSummary, SignWorkflow};
pub use services::assembler::{Assembler, ContainerBuilder};
pub use services::fingerprint::FingerprintCalculator;
