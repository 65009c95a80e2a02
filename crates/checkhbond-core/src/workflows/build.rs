use crate::core::grid::GridSet;
use crate::core::io::pdb::PdbFile;
use crate::core::io::tables::write_residue_section;
use crate::core::io::traits::StructureFile;
use crate::engine::builder::accumulate_structure;
use crate::engine::config::BuildConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Inputs of one table-building run: the corpus list and where the grid
/// table goes.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub corpus_list_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Residue-type passes completed and written.
    pub residue_types: usize,
    /// Corpus structures accepted by the resolution filter.
    pub structures: usize,
    /// Total confirmed pairings recorded across all passes.
    pub bonds_recorded: usize,
}

/// Builds the statistical grid table from a structure corpus.
///
/// One pass per residue type: the grid set is reset, every corpus structure
/// is read fresh and accumulated, and the finished grids are appended to the
/// output table before the next type begins. A structure that fails to read
/// costs a warning, not the run.
#[instrument(skip_all, name = "build_workflow")]
pub fn run(
    request: &BuildRequest,
    config: &BuildConfig,
    reporter: &ProgressReporter,
) -> Result<BuildSummary, EngineError> {
    let corpus = read_corpus_list(&request.corpus_list_path, config.max_resolution)?;
    info!(
        structures = corpus.len(),
        mode = config.mode.label(),
        "corpus list loaded"
    );

    let types: Vec<String> = match &config.residue_types {
        Some(types) => types.clone(),
        None => config
            .mode
            .build_types()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let output = File::create(&request.output_path)?;
    let mut writer = BufWriter::new(output);

    let mut summary = BuildSummary {
        structures: corpus.len(),
        ..BuildSummary::default()
    };
    let mut grids = GridSet::new();

    for residue_type in &types {
        info!(residue_type, "processing residue type");
        reporter.report(Progress::PassStart {
            residue_type: residue_type.clone(),
        });
        reporter.report(Progress::CorpusStart {
            total_structures: corpus.len() as u64,
        });

        grids.reset();
        for path in &corpus {
            match PdbFile::read_from_path(path) {
                Ok(mut structure) => {
                    let stats =
                        accumulate_structure(&mut structure, residue_type, config.mode, &mut grids);
                    summary.bonds_recorded += stats.bonds_recorded;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "structure skipped");
                }
            }
            reporter.report(Progress::StructureDone);
        }

        write_residue_section(&mut writer, residue_type, &grids)?;
        summary.residue_types += 1;
        reporter.report(Progress::PassFinish);
    }

    Ok(summary)
}

/// Parses the corpus list: one structure per line, the path first, the
/// crystallographic resolution as the final column. Comment lines start
/// with `#`. Entries above the resolution threshold are skipped.
fn read_corpus_list(path: &Path, max_resolution: f64) -> Result<Vec<PathBuf>, EngineError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let structure_path = fields.next().ok_or_else(|| EngineError::CorpusList {
            line: line_index + 1,
            message: "missing structure path".to_string(),
        })?;
        let resolution = fields
            .next_back()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| EngineError::CorpusList {
                line: line_index + 1,
                message: "missing or unreadable resolution column".to_string(),
            })?;

        if resolution <= max_resolution {
            entries.push(PathBuf::from(structure_path));
        } else {
            info!(
                structure_path,
                resolution, "discarded, resolution above threshold"
            );
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::read_grid_pair;
    use crate::core::models::atom::Atom;
    use crate::core::models::structure::StructureModel;
    use crate::engine::builder::BuildMode;
    use crate::engine::config::BuildConfigBuilder;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn bonded_structure_file() -> NamedTempFile {
        let mut structure = StructureModel::new();
        let chain = structure.add_chain('A');

        let ser = structure.add_residue(chain, 1, ' ', "SER").unwrap();
        for (name, pos) in [
            ("N", [1.46, 0.0, 0.0]),
            ("CA", [0.0, 0.0, 0.0]),
            ("C", [-0.55, 1.42, 0.0]),
            ("CB", [-0.52, -0.77, 1.21]),
            ("OG", [-1.86, -1.18, 1.05]),
        ] {
            structure
                .add_atom_to_residue(ser, Atom::new(name, ser, Point3::from(pos)))
                .unwrap();
        }

        let asn = structure.add_residue(chain, 20, ' ', "ASN").unwrap();
        for (name, pos) in [
            ("N", [5.0, -1.6, 1.7]),
            ("CA", [4.3, -0.5, 2.2]),
            ("C", [4.9, 0.8, 2.5]),
            ("CB", [2.9, -0.3, 2.0]),
            ("CG", [2.24, -1.18, 1.05]),
            ("OD1", [0.94, -1.18, 1.05]),
            ("ND2", [3.0, 0.2, 1.0]),
        ] {
            structure
                .add_atom_to_residue(asn, Atom::new(name, asn, Point3::from(pos)))
                .unwrap();
        }

        let file = NamedTempFile::new().unwrap();
        PdbFile::write_to_path(&structure, file.path()).unwrap();
        file
    }

    #[test]
    fn builds_a_readable_table_from_a_corpus() {
        let structure_file = bonded_structure_file();

        let mut corpus_list = NamedTempFile::new().unwrap();
        writeln!(
            corpus_list,
            "# test corpus\n{} 1.8",
            structure_file.path().display()
        )
        .unwrap();
        corpus_list.flush().unwrap();

        let output = NamedTempFile::new().unwrap();
        let request = BuildRequest {
            corpus_list_path: corpus_list.path().to_path_buf(),
            output_path: output.path().to_path_buf(),
        };
        let config = BuildConfigBuilder::new()
            .mode(BuildMode::SidechainSidechain)
            .residue_types(vec!["SER".to_string()])
            .build()
            .unwrap();

        let summary = run(&request, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.residue_types, 1);
        assert_eq!(summary.structures, 1);
        assert_eq!(summary.bonds_recorded, 1);

        // The written table must read back with the serine's data in place.
        let table = File::open(output.path()).unwrap();
        let grids = read_grid_pair(&mut BufReader::new(table), "SER", "SER").unwrap();
        assert_eq!(grids.donate.total(), 1);
        assert_eq!(grids.accept.total(), 1);
        assert_eq!(grids.partner_to_donate.total(), 1);
    }

    #[test]
    fn resolution_filter_drops_poor_structures() {
        let structure_file = bonded_structure_file();

        let mut corpus_list = NamedTempFile::new().unwrap();
        writeln!(corpus_list, "{} 3.1", structure_file.path().display()).unwrap();
        corpus_list.flush().unwrap();

        let output = NamedTempFile::new().unwrap();
        let request = BuildRequest {
            corpus_list_path: corpus_list.path().to_path_buf(),
            output_path: output.path().to_path_buf(),
        };
        let config = BuildConfigBuilder::new()
            .mode(BuildMode::SidechainSidechain)
            .residue_types(vec!["SER".to_string()])
            .build()
            .unwrap();

        let summary = run(&request, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.structures, 0);
        assert_eq!(summary.bonds_recorded, 0);
    }

    #[test]
    fn malformed_corpus_line_is_an_error() {
        let mut corpus_list = NamedTempFile::new().unwrap();
        writeln!(corpus_list, "lonely_path_without_resolution").unwrap();
        corpus_list.flush().unwrap();

        let output = NamedTempFile::new().unwrap();
        let request = BuildRequest {
            corpus_list_path: corpus_list.path().to_path_buf(),
            output_path: output.path().to_path_buf(),
        };
        let config = BuildConfigBuilder::new()
            .mode(BuildMode::SidechainSidechain)
            .build()
            .unwrap();

        assert!(matches!(
            run(&request, &config, &ProgressReporter::new()),
            Err(EngineError::CorpusList { line: 1, .. })
        ));
    }

    #[test]
    fn unreadable_structures_are_skipped_not_fatal() {
        let mut corpus_list = NamedTempFile::new().unwrap();
        writeln!(corpus_list, "/nonexistent/structure.ent 1.5").unwrap();
        corpus_list.flush().unwrap();

        let output = NamedTempFile::new().unwrap();
        let request = BuildRequest {
            corpus_list_path: corpus_list.path().to_path_buf(),
            output_path: output.path().to_path_buf(),
        };
        let config = BuildConfigBuilder::new()
            .mode(BuildMode::SidechainSidechain)
            .residue_types(vec!["SER".to_string()])
            .build()
            .unwrap();

        let summary = run(&request, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.residue_types, 1);
        assert_eq!(summary.bonds_recorded, 0);
    }
}
