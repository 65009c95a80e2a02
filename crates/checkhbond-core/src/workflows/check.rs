use crate::core::hbond::table::is_query_capable;
use crate::core::io::pdb::PdbFile;
use crate::core::io::tables::{TableError, read_grid_pair};
use crate::core::io::traits::StructureFile;
use crate::core::models::residue::ResidueSpec;
use crate::engine::analysis::{analyze_pair, reference_energy};
use crate::engine::config::CheckConfig;
use crate::engine::error::EngineError;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// One substitution query: does the hydrogen bond between `key` and
/// `partner` survive with the partner's type replaced by
/// `substitute_type`?
///
/// With `reference_donor_atom` set, the query instead scores the real,
/// currently-present bond donated by that atom of the key residue,
/// producing the calibration value substitution scores are compared
/// against.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub structure_path: PathBuf,
    pub key: ResidueSpec,
    pub partner: ResidueSpec,
    pub substitute_type: String,
    pub reference_donor_atom: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    /// The key residue's type as found in the structure.
    pub key_type: String,
    /// The partner residue's native type as found in the structure.
    pub partner_type: String,
    /// The type the partner was evaluated as.
    pub substitute_type: String,
    /// Best pseudo-energy, or `None` when no hydrogen bond is maintained.
    pub pseudo_energy: Option<f64>,
}

/// Runs one query against the persisted grid table.
///
/// Every pair-level failure (unorientable residues, degenerate fits,
/// residue types absent from the table) resolves to a report with no
/// pseudo-energy rather than an error; errors are reserved for unusable
/// inputs (unreadable files, residues not in the structure at all).
#[instrument(skip_all, name = "check_workflow")]
pub fn run(request: &CheckRequest, config: &CheckConfig) -> Result<CheckReport, EngineError> {
    let mut structure = PdbFile::read_from_path(&request.structure_path)?;

    let key = structure
        .find_residue(&request.key)
        .ok_or(EngineError::ResidueNotFound { spec: request.key })?;
    let partner = structure
        .find_residue(&request.partner)
        .ok_or(EngineError::ResidueNotFound {
            spec: request.partner,
        })?;

    let key_type = structure.residue(key).map(|r| r.name.clone()).unwrap_or_default();
    let partner_type = structure
        .residue(partner)
        .map(|r| r.name.clone())
        .unwrap_or_default();
    let mut report = CheckReport {
        key_type: key_type.clone(),
        partner_type,
        substitute_type: request.substitute_type.clone(),
        pseudo_energy: None,
    };

    if !is_query_capable(&key_type) || !is_query_capable(&request.substitute_type) {
        info!(
            key_type,
            substitute_type = request.substitute_type,
            "residue type outside the query set, no hydrogen bonds"
        );
        return Ok(report);
    }

    let table = File::open(&config.matrix_path).map_err(TableError::Io)?;
    let mut grids =
        match read_grid_pair(&mut BufReader::new(table), &key_type, &request.substitute_type) {
            Ok(grids) => grids,
            Err(TableError::MissingResidue(name)) => {
                warn!(residue_type = name, "no grid data for residue type");
                return Ok(report);
            }
            Err(error) => return Err(error.into()),
        };

    let result = match &request.reference_donor_atom {
        Some(atom_name) => reference_energy(
            &mut structure,
            key,
            partner,
            atom_name,
            &mut grids,
            config.cutoff,
        ),
        None => analyze_pair(&mut structure, key, partner, &mut grids, config.cutoff),
    };

    report.pseudo_energy = match result {
        Ok(energy) => energy,
        Err(error) if error.is_pair_recoverable() => {
            warn!(%error, "pair analysis failed, reporting no hydrogen bond");
            None
        }
        Err(error) => return Err(error),
    };

    match report.pseudo_energy {
        Some(energy) => info!(energy, "hydrogen bond maintained"),
        None => info!("no hydrogen bonds"),
    }
    Ok(report)
}
