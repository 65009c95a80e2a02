use crate::core::grid::{GridIndex, GridKind, GridSet, VoxelGrid};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed table line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Residue type '{0}' not present in the grid table")]
    MissingResidue(String),
}

/// Reads the two residue-type sections a query needs from a persisted grid
/// table.
///
/// The table is scanned sequentially: `residue <NAME>` lines open a section,
/// data lines are `<gridKind> <x> <y> <z> <count>`. The key type contributes
/// its `donate`/`accept` grids, the partner type its `partnertodonate`/
/// `partnertoaccept` grids; the two types may be the same, in which case one
/// section fills all four. Counts for a cell seen twice overwrite, matching
/// the historical dump format which never repeats a cell within a section.
pub fn read_grid_pair(
    reader: &mut impl BufRead,
    key_type: &str,
    partner_type: &str,
) -> Result<GridSet, TableError> {
    let mut grids = GridSet::new();
    let mut in_key = false;
    let mut in_partner = false;
    let mut found_key = false;
    let mut found_partner = false;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix("residue ") {
            let name = name.trim();
            in_key = name == key_type;
            in_partner = name == partner_type;
            found_key |= in_key;
            found_partner |= in_partner;
            continue;
        }

        if !in_key && !in_partner {
            continue;
        }

        let (kind, index, count) = parse_data_line(line, line_index + 1)?;
        match kind {
            GridKind::Donate | GridKind::Accept if in_key => {
                grids.grid_mut(kind).set_count(index, count);
            }
            GridKind::PartnerToDonate | GridKind::PartnerToAccept if in_partner => {
                grids.grid_mut(kind).set_count(index, count);
            }
            _ => {}
        }
    }

    if !found_key {
        return Err(TableError::MissingResidue(key_type.to_string()));
    }
    if !found_partner {
        return Err(TableError::MissingResidue(partner_type.to_string()));
    }
    Ok(grids)
}

fn parse_data_line(line: &str, line_number: usize) -> Result<(GridKind, GridIndex, u32), TableError> {
    let mut fields = line.split_whitespace();

    let kind_text = fields.next().ok_or_else(|| TableError::Parse {
        line: line_number,
        message: "empty data line".to_string(),
    })?;
    let kind: GridKind = kind_text.parse().map_err(|_| TableError::Parse {
        line: line_number,
        message: format!("unknown grid kind '{kind_text}'"),
    })?;

    let mut axis = |name: &str| -> Result<i64, TableError> {
        fields
            .next()
            .and_then(|f| f.parse::<i64>().ok())
            .ok_or_else(|| TableError::Parse {
                line: line_number,
                message: format!("unreadable {name} index"),
            })
    };
    let (x, y, z) = (axis("x")?, axis("y")?, axis("z")?);

    let index = GridIndex::from_signed(x, y, z).ok_or_else(|| TableError::Parse {
        line: line_number,
        message: format!("grid index ({x}, {y}, {z}) outside the cube"),
    })?;

    let count = fields
        .next()
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or_else(|| TableError::Parse {
            line: line_number,
            message: "unreadable count".to_string(),
        })?;

    Ok((kind, index, count))
}

/// Appends one residue-type section to a grid table.
///
/// Only occupied cells are written, coordinates ascending x, then y, then z,
/// one grid at a time in the historical dump order.
pub fn write_residue_section(
    writer: &mut impl Write,
    residue_type: &str,
    grids: &GridSet,
) -> Result<(), TableError> {
    writeln!(writer, "residue {residue_type}")?;
    const DUMP_ORDER: [GridKind; 4] = [
        GridKind::Donate,
        GridKind::PartnerToDonate,
        GridKind::Accept,
        GridKind::PartnerToAccept,
    ];
    for kind in DUMP_ORDER {
        write_grid(writer, kind, grids.grid(kind))?;
    }
    Ok(())
}

fn write_grid(writer: &mut impl Write, kind: GridKind, grid: &VoxelGrid) -> Result<(), TableError> {
    for (index, count) in grid.occupied() {
        writeln!(
            writer,
            "{kind}\t{x:8}\t{y:8}\t{z:8}\t{count:6}",
            x = index.x,
            y = index.y,
            z = index.z,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn table_text() -> String {
        "residue SER\n\
         donate\t      10\t      11\t      12\t     3\n\
         accept\t      10\t      11\t      13\t     2\n\
         partnertodonate\t      20\t      21\t      22\t     7\n\
         partnertoaccept\t      20\t      21\t      23\t     9\n\
         residue ASN\n\
         donate\t       5\t       6\t       7\t     1\n\
         partnertodonate\t      30\t      31\t      32\t     4\n\
         partnertoaccept\t      30\t      31\t      33\t     5\n"
            .to_string()
    }

    #[test]
    fn reads_key_and_partner_sections() {
        let text = table_text();
        let mut reader = BufReader::new(text.as_bytes());
        let grids = read_grid_pair(&mut reader, "SER", "ASN").unwrap();

        // Key grids come from the SER section.
        assert_eq!(grids.donate.count(GridIndex { x: 10, y: 11, z: 12 }), 3);
        assert_eq!(grids.accept.count(GridIndex { x: 10, y: 11, z: 13 }), 2);
        // SER's own partner data must NOT leak into the partner grids.
        assert_eq!(
            grids
                .partner_to_donate
                .count(GridIndex { x: 20, y: 21, z: 22 }),
            0
        );
        // Partner grids come from the ASN section.
        assert_eq!(
            grids
                .partner_to_donate
                .count(GridIndex { x: 30, y: 31, z: 32 }),
            4
        );
        assert_eq!(
            grids
                .partner_to_accept
                .count(GridIndex { x: 30, y: 31, z: 33 }),
            5
        );
        // ASN's own donate data stays out of the key grids.
        assert_eq!(grids.donate.count(GridIndex { x: 5, y: 6, z: 7 }), 0);
    }

    #[test]
    fn same_type_for_key_and_partner_fills_all_four() {
        let text = table_text();
        let mut reader = BufReader::new(text.as_bytes());
        let grids = read_grid_pair(&mut reader, "SER", "SER").unwrap();

        assert_eq!(grids.donate.count(GridIndex { x: 10, y: 11, z: 12 }), 3);
        assert_eq!(
            grids
                .partner_to_accept
                .count(GridIndex { x: 20, y: 21, z: 23 }),
            9
        );
    }

    #[test]
    fn missing_residue_is_reported_by_name() {
        let text = table_text();
        let mut reader = BufReader::new(text.as_bytes());
        let err = read_grid_pair(&mut reader, "SER", "TRP").unwrap_err();
        assert!(matches!(err, TableError::MissingResidue(name) if name == "TRP"));
    }

    #[test]
    fn out_of_cube_index_is_a_parse_error() {
        let text = "residue SER\ndonate\t999\t0\t0\t1\n";
        let mut reader = BufReader::new(text.as_bytes());
        let err = read_grid_pair(&mut reader, "SER", "SER").unwrap_err();
        assert!(matches!(err, TableError::Parse { line: 2, .. }));
    }

    #[test]
    fn unknown_grid_kind_is_a_parse_error() {
        let text = "residue SER\nmainchain\t1\t2\t3\t4\n";
        let mut reader = BufReader::new(text.as_bytes());
        let err = read_grid_pair(&mut reader, "SER", "SER").unwrap_err();
        assert!(matches!(err, TableError::Parse { line: 2, .. }));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut grids = GridSet::new();
        grids.donate.increment(GridIndex { x: 1, y: 2, z: 3 });
        grids.donate.increment(GridIndex { x: 1, y: 2, z: 3 });
        grids
            .partner_to_accept
            .increment(GridIndex { x: 40, y: 41, z: 42 });

        let mut buffer = Vec::new();
        write_residue_section(&mut buffer, "TYR", &grids).unwrap();

        let mut reader = BufReader::new(buffer.as_slice());
        let reread = read_grid_pair(&mut reader, "TYR", "TYR").unwrap();
        assert_eq!(reread.donate.count(GridIndex { x: 1, y: 2, z: 3 }), 2);
        assert_eq!(
            reread
                .partner_to_accept
                .count(GridIndex { x: 40, y: 41, z: 42 }),
            1
        );
    }
}
