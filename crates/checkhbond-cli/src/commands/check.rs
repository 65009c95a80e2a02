use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::parse_residue_spec;
use checkhbond::engine::config::{CheckConfig, CheckConfigBuilder};
use checkhbond::workflows::check::{self, CheckRequest};
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let request = CheckRequest {
        structure_path: args.input.clone(),
        key: parse_residue_spec(&args.key)?,
        partner: parse_residue_spec(&args.partner)?,
        substitute_type: args.substitute.to_ascii_uppercase(),
        reference_donor_atom: args.reference_donor.clone(),
    };

    info!(
        "Checking {} -> {} with partner evaluated as {}",
        args.key, args.partner, request.substitute_type
    );
    let report = check::run(&request, &config)?;

    match report.pseudo_energy {
        Some(energy) => {
            println!("Pseudoenergy of best quality hydrogen bond: {energy:.6}");
        }
        None => {
            println!("No hydrogen bonds");
        }
    }
    Ok(())
}

/// Settles the effective configuration: the TOML file when given, CLI flags
/// taking precedence over it.
fn resolve_config(args: &CheckArgs) -> Result<CheckConfig> {
    let mut config = match &args.config {
        Some(path) => Some(CheckConfig::load(path)?),
        None => None,
    };

    if let Some(matrix) = &args.matrix {
        match &mut config {
            Some(config) => config.matrix_path = matrix.clone(),
            None => {
                config = Some(
                    CheckConfigBuilder::new()
                        .matrix_path(matrix.clone())
                        .build()?,
                )
            }
        }
    }

    let mut config = config.ok_or_else(|| {
        CliError::Argument("a grid table is required: pass --matrix or --config".to_string())
    })?;

    if let Some(cutoff) = args.cutoff {
        if cutoff < 0.0 {
            return Err(CliError::Argument(
                "cutoff must be non-negative".to_string(),
            ));
        }
        config.cutoff = cutoff;
    }
    Ok(config)
}
