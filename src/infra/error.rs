//! Error types for VEO assembly and fingerprinting.
//!
//! Every failure carries the component it originated in and a small numeric
//! code. Errors propagate unmodified to the binary entry point, which prints
//! them once and exits non-zero; nothing in the core recovers from a failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::container::ContainerRuleError;

/// Result type for VEO operations
pub type VeoResult<T> = Result<T, VeoError>;

/// Fatal error categories for a signing run
#[derive(Error, Debug, miette::Diagnostic)]
pub enum VeoError {
    /// Bad or missing configuration (CLI argument, unknown hash algorithm).
    /// Raised before any file is touched.
    #[error("{component}: configuration error {code}: {message}")]
    Configuration {
        component: &'static str,
        code: u16,
        message: String,
    },

    /// A named filesystem object is missing or of the wrong kind
    #[error("{component}: resource error {code}: {message}: {}", .path.display())]
    Resource {
        component: &'static str,
        code: u16,
        message: String,
        path: PathBuf,
    },

    /// Credential unlock or signing failure
    #[error("{component}: crypto error {code}: {message}")]
    Crypto {
        component: &'static str,
        code: u16,
        message: String,
    },

    /// I/O failure while assembling or streaming; partial output is never valid
    #[error("{component}: I/O error {code}: {message}")]
    Io {
        component: &'static str,
        code: u16,
        message: String,
    },
}

impl VeoError {
    pub fn configuration(component: &'static str, code: u16, message: impl Into<String>) -> Self {
        VeoError::Configuration {
            component,
            code,
            message: message.into(),
        }
    }

    pub fn resource(
        component: &'static str,
        code: u16,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        VeoError::Resource {
            component,
            code,
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn crypto(component: &'static str, code: u16, message: impl Into<String>) -> Self {
        VeoError::Crypto {
            component,
            code,
            message: message.into(),
        }
    }

    pub fn io(component: &'static str, code: u16, message: impl Into<String>) -> Self {
        VeoError::Io {
            component,
            code,
            message: message.into(),
        }
    }

    /// Originating component name
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            VeoError::Configuration { component, .. }
            | VeoError::Resource { component, .. }
            | VeoError::Crypto { component, .. }
            | VeoError::Io { component, .. } => component,
        }
    }

    /// Numeric error code
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            VeoError::Configuration { code, .. }
            | VeoError::Resource { code, .. }
            | VeoError::Crypto { code, .. }
            | VeoError::Io { code, .. } => *code,
        }
    }
}

impl From<std::io::Error> for VeoError {
    fn from(error: std::io::Error) -> Self {
        VeoError::io("io", 1, error.to_string())
    }
}

impl From<openssl::error::ErrorStack> for VeoError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        VeoError::crypto("openssl", 1, error.to_string())
    }
}

impl From<ContainerRuleError> for VeoError {
    fn from(error: ContainerRuleError) -> Self {
        VeoError::io("container", 30, error.to_string())
    }
}
