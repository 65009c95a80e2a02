use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use checkhbond::engine::builder::BuildMode;
use checkhbond::engine::config::{BuildConfig, BuildConfigBuilder};
use checkhbond::engine::progress::ProgressReporter;
use checkhbond::workflows::build::{self, BuildRequest};
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let request = BuildRequest {
        corpus_list_path: args.corpus.clone(),
        output_path: args.output.clone(),
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building {} grid tables...", config.mode.label());
    let summary = build::run(&request, &config, &reporter)?;

    info!(
        residue_types = summary.residue_types,
        bonds = summary.bonds_recorded,
        "build finished"
    );
    println!(
        "Done: {} residue type(s) over {} structure(s), {} hydrogen bonds recorded.",
        summary.residue_types, summary.structures, summary.bonds_recorded
    );
    println!("Grid table written to: {}", args.output.display());
    Ok(())
}

/// Settles the effective configuration: the TOML file when given, CLI flags
/// taking precedence over it.
fn resolve_config(args: &BuildArgs) -> Result<BuildConfig> {
    let mode_override = args
        .mode
        .as_deref()
        .map(|text| {
            text.parse::<BuildMode>()
                .map_err(CliError::Argument)
        })
        .transpose()?;

    let mut config = match &args.config {
        Some(path) => Some(BuildConfig::load(path)?),
        None => None,
    };

    if let Some(mode) = mode_override {
        match &mut config {
            Some(config) => config.mode = mode,
            None => config = Some(BuildConfigBuilder::new().mode(mode).build()?),
        }
    }

    let mut config = config.ok_or_else(|| {
        CliError::Argument("a build mode is required: pass --mode or --config".to_string())
    })?;

    if let Some(resolution) = args.max_resolution {
        config.max_resolution = resolution;
    }
    if let Some(types) = &args.residue_types {
        config.residue_types = Some(
            types
                .iter()
                .map(|t| t.to_ascii_uppercase())
                .collect(),
        );
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(mode: Option<&str>) -> BuildArgs {
        BuildArgs {
            corpus: PathBuf::from("corpus.list"),
            output: PathBuf::from("matrices.txt"),
            config: None,
            mode: mode.map(str::to_string),
            max_resolution: None,
            residue_types: None,
        }
    }

    #[test]
    fn mode_flag_alone_is_enough() {
        let config = resolve_config(&args(Some("mainchain-donor"))).unwrap();
        assert_eq!(config.mode, BuildMode::MainchainDonor);
        assert_eq!(config.max_resolution, 2.5);
    }

    #[test]
    fn unknown_mode_is_an_argument_error() {
        assert!(matches!(
            resolve_config(&args(Some("backwards"))),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn missing_mode_is_an_argument_error() {
        assert!(matches!(
            resolve_config(&args(None)),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn residue_types_are_uppercased() {
        let mut build_args = args(Some("sidechain-sidechain"));
        build_args.residue_types = Some(vec!["ser".to_string(), "Asn".to_string()]);
        let config = resolve_config(&build_args).unwrap();
        assert_eq!(
            config.residue_types,
            Some(vec!["SER".to_string(), "ASN".to_string()])
        );
    }
}
