//! Configuration resolution.
//!
//! Resolution happens in two stages so failures land in the right category:
//! `RunConfig::resolve` validates argument presence and algorithm names
//! without touching the filesystem (configuration errors), then
//! `RunConfig::check_paths` verifies each named path exists and is the right
//! kind of object (resource errors, carrying the offending path). Only after
//! both passes does the run open any file.
//!
//! A small optional TOML file can supply defaults; command-line flags always
//! win.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::crypto::HashAlgorithm;
use crate::domain::types::CredentialSecret;
use crate::infra::error::{VeoError, VeoResult};

const COMPONENT: &str = "config";

/// Raw command-line input, before validation. Collected by the binary's
/// argument parser; resolution below is parser-independent.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// `-h <alg>`
    pub hash: Option<String>,
    /// `-s <pfxFile> [secret]` — one or two values
    pub signer: Vec<String>,
    /// `-o <dir>`
    pub output_dir: Option<PathBuf>,
    /// `-v`
    pub verbose: bool,
    /// trailing positional
    pub signed_object: Option<PathBuf>,
}

/// Defaults read from the optional config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerDefaults {
    /// Default hash algorithm name
    pub hash_algorithm: String,
    /// Default output directory
    pub output_dir: PathBuf,
    /// Default verbosity
    pub verbose: bool,
}

impl Default for SignerDefaults {
    fn default() -> Self {
        Self {
            hash_algorithm: "SHA256".to_string(),
            output_dir: PathBuf::from("."),
            verbose: false,
        }
    }
}

/// Location of the optional defaults file
#[must_use]
pub fn defaults_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("veo-signer").join("config.toml"))
}

/// Load defaults from the config file, or built-ins when none exists.
/// A present-but-malformed file is a configuration error, not a fallback.
pub fn load_defaults() -> VeoResult<SignerDefaults> {
    let Some(path) = defaults_path() else {
        return Ok(SignerDefaults::default());
    };
    if !path.exists() {
        return Ok(SignerDefaults::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| {
        VeoError::configuration(
            COMPONENT,
            4,
            format!("cannot read defaults file {}: {e}", path.display()),
        )
    })?;
    let defaults: SignerDefaults = toml::from_str(&content).map_err(|e| {
        VeoError::configuration(
            COMPONENT,
            5,
            format!("malformed defaults file {}: {e}", path.display()),
        )
    })?;
    log::debug!("defaults loaded from {}", path.display());
    Ok(defaults)
}

/// Fully resolved configuration for one signing run
#[derive(Debug)]
pub struct RunConfig {
    pub hash_algorithm: HashAlgorithm,
    pub pfx_path: PathBuf,
    /// Secret from the command line; `None` means prompt interactively
    pub secret: Option<CredentialSecret>,
    pub output_dir: PathBuf,
    pub signed_object: PathBuf,
    pub verbose: bool,
}

impl RunConfig {
    /// Validate arguments against defaults. Pure: no filesystem access, so
    /// a missing mandatory argument fails before any file is touched.
    pub fn resolve(args: CliArgs, defaults: &SignerDefaults) -> VeoResult<Self> {
        let hash_name = args
            .hash
            .unwrap_or_else(|| defaults.hash_algorithm.clone());
        let hash_algorithm: HashAlgorithm = hash_name.parse()?;

        if args.signer.is_empty() {
            return Err(VeoError::configuration(
                COMPONENT,
                2,
                "no credential file specified (-s <pfxFile> [password])",
            ));
        }
        let pfx_path = PathBuf::from(&args.signer[0]);
        let secret = match args.signer.get(1) {
            Some(raw) => Some(CredentialSecret::new(raw.clone())?),
            None => None,
        };

        let signed_object = args.signed_object.ok_or_else(|| {
            VeoError::configuration(COMPONENT, 3, "no signed object file specified")
        })?;

        let output_dir = args.output_dir.unwrap_or_else(|| defaults.output_dir.clone());
        let verbose = args.verbose || defaults.verbose;

        Ok(Self {
            hash_algorithm,
            pfx_path,
            secret,
            output_dir,
            signed_object,
            verbose,
        })
    }

    /// Check every configured path: existence and kind only, nothing is
    /// opened. Errors name the offending path.
    pub fn check_paths(&self) -> VeoResult<()> {
        check_is_file("PFX file", &self.pfx_path)?;
        check_is_file("signed object", &self.signed_object)?;
        check_is_dir("output directory", &self.output_dir)?;
        log::debug!("PFX file: {}", self.pfx_path.display());
        log::debug!("signed object: {}", self.signed_object.display());
        log::debug!("output directory: {}", self.output_dir.display());
        Ok(())
    }

    /// Target container path: the signed object's file name with a `.veo`
    /// suffix appended, placed in the output directory.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        let name = self
            .signed_object
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "signed-object".to_string());
        self.output_dir.join(format!("{name}.veo"))
    }
}

fn check_is_file(what: &str, path: &Path) -> VeoResult<()> {
    if !path.exists() {
        return Err(VeoError::resource(
            COMPONENT,
            11,
            format!("{what} does not exist"),
            path,
        ));
    }
    if path.is_dir() {
        return Err(VeoError::resource(
            COMPONENT,
            12,
            format!("{what} is a directory, not a file"),
            path,
        ));
    }
    Ok(())
}

fn check_is_dir(what: &str, path: &Path) -> VeoResult<()> {
    if !path.exists() {
        return Err(VeoError::resource(
            COMPONENT,
            13,
            format!("{what} does not exist"),
            path,
        ));
    }
    if !path.is_dir() {
        return Err(VeoError::resource(
            COMPONENT,
            14,
            format!("{what} is a file, not a directory"),
            path,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_signer() -> CliArgs {
        CliArgs {
            signer: vec!["signer.pfx".to_string(), "pass".to_string()],
            signed_object: Some(PathBuf::from("contents.xml")),
            ..CliArgs::default()
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let config = RunConfig::resolve(args_with_signer(), &SignerDefaults::default()).unwrap();
        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.secret.as_ref().unwrap().as_str(), "pass");
        assert!(!config.verbose);
    }

    #[test]
    fn missing_signer_is_a_configuration_error() {
        let args = CliArgs {
            signed_object: Some(PathBuf::from("contents.xml")),
            ..CliArgs::default()
        };
        let err = RunConfig::resolve(args, &SignerDefaults::default()).unwrap_err();
        assert!(matches!(err, VeoError::Configuration { .. }));
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn missing_signed_object_is_a_configuration_error() {
        let args = CliArgs {
            signer: vec!["signer.pfx".to_string()],
            ..CliArgs::default()
        };
        let err = RunConfig::resolve(args, &SignerDefaults::default()).unwrap_err();
        assert_eq!(err.code(), 3);
    }

    #[test]
    fn omitted_secret_means_prompt() {
        let args = CliArgs {
            signer: vec!["signer.pfx".to_string()],
            signed_object: Some(PathBuf::from("contents.xml")),
            ..CliArgs::default()
        };
        let config = RunConfig::resolve(args, &SignerDefaults::default()).unwrap();
        assert!(config.secret.is_none());
    }

    #[test]
    fn unknown_hash_rejected_before_path_checks() {
        let mut args = args_with_signer();
        args.hash = Some("md5".to_string());
        assert!(RunConfig::resolve(args, &SignerDefaults::default()).is_err());
    }

    #[test]
    fn target_path_appends_veo_suffix() {
        let mut args = args_with_signer();
        args.output_dir = Some(PathBuf::from("/out"));
        let config = RunConfig::resolve(args, &SignerDefaults::default()).unwrap();
        assert_eq!(config.target_path(), PathBuf::from("/out/contents.xml.veo"));
    }

    #[test]
    fn check_paths_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let pfx = dir.path().join("signer.pfx");
        std::fs::write(&pfx, b"stub").unwrap();
        let missing = dir.path().join("missing.xml");

        let config = RunConfig {
            hash_algorithm: HashAlgorithm::Sha256,
            pfx_path: pfx,
            secret: None,
            output_dir: dir.path().to_path_buf(),
            signed_object: missing.clone(),
            verbose: false,
        };
        let err = config.check_paths().unwrap_err();
        match err {
            VeoError::Resource { path, .. } => assert_eq!(path, missing),
            other => panic!("expected resource error, got {other:?}"),
        }
    }
}
