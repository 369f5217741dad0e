//! VEO signer command-line interface.
//!
//! Wraps a signed-object fragment into a signed `.veo` container and prints
//! the canonical fingerprint of the fragment for comparison against a
//! vendor-produced container.

use std::path::PathBuf;

use clap::Parser;
use miette::Result;
use veo_signer::{load_defaults, CliArgs, RunConfig, SignWorkflow};

const USAGE: &str = "\
veo-signer [-h <hashAlg>] -s <pfxFile> [<password>] [-o <outputDir>] [-v] <signedObject>

  -h <alg>      hash algorithm: SHA1, SHA256, SHA384 or SHA512 (default SHA256)
  -s <pfx> [pw] PKCS#12 credential file and its password (prompted if omitted)
  -o <dir>      output directory for the .veo container (default: .)
  -v            verbose diagnostics on stderr
  --help        print this summary and continue
  <signedObject> signed object fragment to wrap (mandatory)
";

// `-h` selects the hash algorithm, as in the original tool, so clap's
// automatic help flag is disabled and `--help` is handled explicitly.
#[derive(Parser)]
#[command(
    name = "veo-signer",
    version,
    about = "Builds a signed VEO from a signed object and a PFX credential",
    disable_help_flag = true
)]
struct Cli {
    /// Hash algorithm (SHA1, SHA256, SHA384, SHA512)
    #[arg(short = 'h', long = "hash", value_name = "ALGORITHM")]
    hash: Option<String>,

    /// Credential PKCS#12 file, optionally followed by its password
    #[arg(
        short = 's',
        long = "signer",
        num_args = 1..=2,
        value_names = ["PFX_FILE", "PASSWORD"]
    )]
    signer: Vec<String>,

    /// Output directory for the generated container
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Verbose diagnostic output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print the option summary and continue
    #[arg(long = "help")]
    help: bool,

    /// Signed object fragment to wrap
    #[arg(value_name = "SIGNED_OBJECT")]
    signed_object: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        eprint!("{USAGE}");
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let defaults = load_defaults()?;
    let args = CliArgs {
        hash: cli.hash,
        signer: cli.signer,
        output_dir: cli.output,
        verbose: cli.verbose,
        signed_object: cli.signed_object,
    };
    let config = RunConfig::resolve(args, &defaults)?;
    config.check_paths()?;

    let workflow = SignWorkflow::new(config);
    let summary = workflow.run()?;

    println!("Hash of signed object: {}", summary.fingerprint);
    Ok(())
}
