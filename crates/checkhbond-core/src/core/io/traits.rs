use crate::core::models::structure::StructureModel;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing structure file formats.
///
/// Implementors handle format-specific parsing and serialization; the
/// path-based helpers wrap the stream methods with buffered file handles.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    fn read_from(reader: &mut impl BufRead) -> Result<StructureModel, Self::Error>;

    /// Writes a structure to a writer.
    fn write_to(structure: &StructureModel, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a structure from a file path.
    fn read_from_path(path: impl AsRef<Path>) -> Result<StructureModel, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a structure to a file path.
    fn write_to_path(
        structure: &StructureModel,
        path: impl AsRef<Path>,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, &mut writer)
    }
}
