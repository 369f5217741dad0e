//! Adapters binding the core services to their collaborators: the on-disk
//! container format, PKCS#12 credential files, and interactive secret entry.

pub mod pfx;
pub mod prompt;
pub mod veo_file;

pub use pfx::{PfxCredentialStore, SigningCredential};
pub use veo_file::VeoFileBuilder;
