use super::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::structure::StructureModel;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed record at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("No ATOM records found")]
    Empty,
}

/// Reader/writer for the fixed-column PDB coordinate format.
///
/// Only `ATOM` records are consumed; heteroatoms, waters, and everything else
/// are not part of the analysis. Alternate locations other than the primary
/// one are dropped so each atom name resolves to a single position.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<StructureModel, Self::Error> {
        let mut structure = StructureModel::new();
        let mut atom_count = 0usize;

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            if !line.starts_with("ATOM  ") {
                continue;
            }
            let record = parse_atom_record(&line, line_index + 1)?;
            if record.alt_loc != ' ' && record.alt_loc != 'A' {
                continue;
            }

            let chain_id = structure.add_chain(record.chain_id);
            let residue_id = structure
                .add_residue(
                    chain_id,
                    record.residue_number,
                    record.insertion_code,
                    &record.residue_name,
                )
                .ok_or_else(|| PdbError::Parse {
                    line: line_index + 1,
                    message: "residue could not be registered".to_string(),
                })?;
            structure.add_atom_to_residue(
                residue_id,
                Atom::new(&record.atom_name, residue_id, record.position),
            );
            atom_count += 1;
        }

        if atom_count == 0 {
            return Err(PdbError::Empty);
        }
        Ok(structure)
    }

    fn write_to(structure: &StructureModel, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut serial = 1usize;
        for residue_id in structure.residues_in_order() {
            let residue = match structure.residue(residue_id) {
                Some(r) => r,
                None => continue,
            };
            let chain_char = structure
                .chain(residue.chain_id)
                .map(|c| c.id)
                .unwrap_or(' ');
            for &atom_id in residue.atoms() {
                let atom = match structure.atom(atom_id) {
                    Some(a) => a,
                    None => continue,
                };
                writeln!(
                    writer,
                    "ATOM  {serial:>5} {name:<4}{res:>4}{chain:>2}{num:>4}{icode}   {x:>8.3}{y:>8.3}{z:>8.3}{occ:>6.2}{bval:>6.2}",
                    serial = serial,
                    name = atom.name,
                    res = residue.name,
                    chain = chain_char,
                    num = residue.number,
                    icode = residue.insertion_code,
                    x = atom.position.x,
                    y = atom.position.y,
                    z = atom.position.z,
                    occ = 1.00,
                    bval = 0.00,
                )?;
                serial += 1;
            }
        }
        writeln!(writer, "TER")?;
        Ok(())
    }
}

struct AtomRecord {
    atom_name: String,
    alt_loc: char,
    residue_name: String,
    chain_id: char,
    residue_number: isize,
    insertion_code: char,
    position: Point3<f64>,
}

fn parse_atom_record(line: &str, line_number: usize) -> Result<AtomRecord, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_number,
            message: "ATOM record shorter than 54 columns".to_string(),
        });
    }

    let field = |range: std::ops::Range<usize>| line[range].trim().to_string();
    let coordinate = |range: std::ops::Range<usize>, axis: &str| {
        line[range]
            .trim()
            .parse::<f64>()
            .map_err(|_| PdbError::Parse {
                line: line_number,
                message: format!("unreadable {axis} coordinate"),
            })
    };

    let residue_number =
        line[22..26]
            .trim()
            .parse::<isize>()
            .map_err(|_| PdbError::Parse {
                line: line_number,
                message: "unreadable residue number".to_string(),
            })?;

    Ok(AtomRecord {
        atom_name: field(12..16),
        alt_loc: line.as_bytes()[16] as char,
        residue_name: field(17..20),
        chain_id: line.as_bytes()[21] as char,
        residue_number,
        insertion_code: line.as_bytes()[26] as char,
        position: Point3::new(
            coordinate(30..38, "x")?,
            coordinate(38..46, "y")?,
            coordinate(46..54, "z")?,
        ),
    })
}
