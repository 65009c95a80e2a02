use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Alison L. Cuff, Andrew C. R. Martin",
    version,
    about = "checkhbond - assesses whether a protein hydrogen bond would be maintained after an amino-acid substitution, scored against statistical geometry from a reference corpus.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test one structure/substitution pair against a persisted grid table.
    Check(CheckArgs),
    /// Build the statistical grid tables from a corpus of structures.
    Build(BuildArgs),
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the input structure file (PDB format).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// The key residue, as chain + number + optional insertion code (e.g. A23).
    #[arg(value_name = "KEY")]
    pub key: String,

    /// The partner residue, in the same form (e.g. A57B).
    #[arg(value_name = "PARTNER")]
    pub partner: String,

    /// Three-letter type the partner is evaluated as (the substitution).
    #[arg(value_name = "SUBSTITUTE")]
    pub substitute: String,

    /// Path to the main configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the grid table file from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub matrix: Option<PathBuf>,

    /// Override the off-cell matching cutoff distance in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Score the real bond donated by this atom of the key residue instead
    /// of testing a substitution (reference-energy mode).
    #[arg(long, value_name = "ATOM")]
    pub reference_donor: Option<String>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Corpus list file: one structure path plus resolution per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub corpus: PathBuf,

    /// Path for the output grid table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the main configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Donor/acceptor geometry to accumulate: sidechain-sidechain,
    /// sidechain-mainchain, mainchain-donor, or mainchain-acceptor.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Override the corpus resolution threshold in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub max_resolution: Option<f64>,

    /// Restrict the run to these residue types (three-letter codes).
    #[arg(short = 't', long = "types", value_name = "TYPE", num_args(1..))]
    pub residue_types: Option<Vec<String>>,
}
