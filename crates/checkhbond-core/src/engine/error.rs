use crate::core::geometry::fit::FitError;
use crate::core::geometry::orientation::OrientationError;
use crate::core::io::pdb::PdbError;
use crate::core::io::tables::TableError;
use crate::core::models::residue::ResidueSpec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Residue not found in structure: {spec:?}")]
    ResidueNotFound { spec: ResidueSpec },

    #[error("Backbone atom '{atom_name}' missing from residue {residue_number}")]
    BackboneAtomMissing {
        atom_name: &'static str,
        residue_number: isize,
    },

    #[error("Atom '{atom_name}' not found in residue {residue_number}")]
    AtomNotFound {
        atom_name: String,
        residue_number: isize,
    },

    #[error("Frame orientation failed: {source}")]
    Orientation {
        #[from]
        source: OrientationError,
    },

    #[error("Rigid fit failed: {source}")]
    Fit {
        #[from]
        source: FitError,
    },

    #[error("Grid table error: {source}")]
    Table {
        #[from]
        source: TableError,
    },

    #[error("Structure file error: {source}")]
    Structure {
        #[from]
        source: PdbError,
    },

    #[error("Corpus list error at line {line}: {message}")]
    CorpusList { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether the failure is confined to one residue pair. A recoverable
    /// failure means "no hydrogen bond maintained" for that pair; batch
    /// drivers continue with the next pair or structure.
    pub fn is_pair_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Orientation { .. }
                | EngineError::Fit { .. }
                | EngineError::BackboneAtomMissing { .. }
                | EngineError::AtomNotFound { .. }
        )
    }
}
