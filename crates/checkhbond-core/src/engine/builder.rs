use crate::core::geometry::orientation::{AnchorTriple, orientate};
use crate::core::grid::{GridSet, quantize};
use crate::core::hbond::table::{self, HBondRecord};
use crate::core::hbond::validity::valid_hbond;
use crate::core::models::ids::ResidueId;
use crate::core::models::structure::StructureModel;
use nalgebra::Point3;
use serde::Deserialize;
use std::str::FromStr;
use tracing::warn;

/// Which donor/acceptor geometry a build pass accumulates. The four
/// historical single-purpose builder programs collapse into this selector;
/// the orientation pipeline and the bond bookkeeping are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Side-chain donors/acceptors of the key type against partner side chains.
    SidechainSidechain,
    /// Side-chain donors/acceptors of the key type against partner backbones.
    SidechainMainchain,
    /// The key type's backbone amide N-H as the donor.
    MainchainDonor,
    /// The key type's backbone carbonyl C=O as the acceptor.
    MainchainAcceptor,
}

impl BuildMode {
    /// The canonical frame each key residue is oriented into before its
    /// grid cells are recorded.
    pub fn anchor_triple(&self) -> AnchorTriple {
        match self {
            BuildMode::SidechainSidechain | BuildMode::SidechainMainchain => AnchorTriple::NCaCb,
            BuildMode::MainchainDonor => AnchorTriple::CNCa,
            BuildMode::MainchainAcceptor => AnchorTriple::CaCO,
        }
    }

    /// The residue types a pass of this mode iterates.
    pub fn build_types(&self) -> Vec<&'static str> {
        match self {
            BuildMode::SidechainSidechain | BuildMode::SidechainMainchain => {
                table::sidechain_build_types().collect()
            }
            BuildMode::MainchainDonor | BuildMode::MainchainAcceptor => {
                table::mainchain_build_types().collect()
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildMode::SidechainSidechain => "sidechain-sidechain",
            BuildMode::SidechainMainchain => "sidechain-mainchain",
            BuildMode::MainchainDonor => "mainchain-donor",
            BuildMode::MainchainAcceptor => "mainchain-acceptor",
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sidechain-sidechain" => Ok(BuildMode::SidechainSidechain),
            "sidechain-mainchain" => Ok(BuildMode::SidechainMainchain),
            "mainchain-donor" => Ok(BuildMode::MainchainDonor),
            "mainchain-acceptor" => Ok(BuildMode::MainchainAcceptor),
            other => Err(format!("unknown build mode '{other}'")),
        }
    }
}

/// Tallies from accumulating one structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulationStats {
    /// Residues of the target type encountered.
    pub residues_seen: usize,
    /// Of those, residues successfully oriented and recorded.
    pub residues_oriented: usize,
    /// Confirmed hydrogen-bond pairings written into the partner grids.
    pub bonds_recorded: usize,
}

/// Accumulates one structure's contribution to a residue type's grid set.
///
/// Every residue of the target type is oriented into the mode's canonical
/// frame (re-orienting the whole structure each time), its own
/// donor/acceptor cells are recorded, and every other residue is scanned for
/// geometrically valid hydrogen bonds whose partner atoms land in the
/// partner grids. Residues that cannot be oriented (missing anchors, chain
/// starts for the donor mode) are skipped with a warning; positions outside
/// the grid cube are expected for distant partners and skipped silently.
pub fn accumulate_structure(
    structure: &mut StructureModel,
    residue_type: &str,
    mode: BuildMode,
    grids: &mut GridSet,
) -> AccumulationStats {
    let mut stats = AccumulationStats::default();

    for residue_id in structure.residues_in_order() {
        let Some(residue) = structure.residue(residue_id) else {
            continue;
        };
        if residue.name != residue_type {
            continue;
        }
        // Proline's ring nitrogen has no amide hydrogen to donate.
        if mode == BuildMode::MainchainDonor && residue.name == "PRO" {
            continue;
        }
        stats.residues_seen += 1;
        let residue_number = residue.number;

        if let Err(error) = orientate(structure, residue_id, mode.anchor_triple()) {
            warn!(residue_number, %error, "residue skipped, cannot orientate");
            continue;
        }
        stats.residues_oriented += 1;

        record_self_positions(structure, residue_id, mode, grids);

        for other_id in structure.residues_in_order() {
            if other_id == residue_id {
                continue;
            }
            stats.bonds_recorded += record_partner_bonds(structure, residue_id, other_id, mode, grids);
        }
    }
    stats
}

/// Records the key residue's own hydrogen-bonding atom cells.
fn record_self_positions(
    structure: &StructureModel,
    residue_id: ResidueId,
    mode: BuildMode,
    grids: &mut GridSet,
) {
    let Some(residue) = structure.residue(residue_id) else {
        return;
    };
    match mode {
        BuildMode::SidechainSidechain | BuildMode::SidechainMainchain => {
            for record in table::records_for(&residue.name) {
                let Some(position) = prefix_atom_position(structure, residue_id, record.atom)
                else {
                    continue;
                };
                let Some(cell) = quantize(&position) else {
                    continue;
                };
                if record.donates {
                    grids.donate.increment(cell);
                }
                if record.accepts {
                    grids.accept.increment(cell);
                }
            }
        }
        BuildMode::MainchainDonor => {
            if let Some(cell) = structure
                .atom_position(residue_id, "N")
                .and_then(|p| quantize(&p))
            {
                grids.donate.increment(cell);
            }
        }
        BuildMode::MainchainAcceptor => {
            if let Some(cell) = structure
                .atom_position(residue_id, "O")
                .and_then(|p| quantize(&p))
            {
                grids.accept.increment(cell);
            }
        }
    }
}

/// Confirms and records hydrogen bonds between the oriented key residue and
/// one other residue. Returns the number of pairings recorded.
fn record_partner_bonds(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    mode: BuildMode,
    grids: &mut GridSet,
) -> usize {
    match mode {
        BuildMode::SidechainSidechain => {
            record_sidechain_donor_bonds(structure, key, other, grids)
                + record_sidechain_acceptor_bonds(structure, key, other, grids)
        }
        BuildMode::SidechainMainchain => {
            record_donors_to_mainchain(structure, key, other, grids)
                + record_acceptors_from_mainchain(structure, key, other, grids)
        }
        BuildMode::MainchainDonor => record_mainchain_donor_bonds(structure, key, other, grids),
        BuildMode::MainchainAcceptor => {
            record_mainchain_acceptor_bonds(structure, key, other, grids)
        }
    }
}

/// Key side-chain donors against the other residue's side-chain acceptors;
/// confirmed partner acceptor atoms go into `partnertodonate`.
fn record_sidechain_donor_bonds(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    let mut recorded = 0;
    for (donor_pos, donor_record) in capable_atoms(structure, key, |r| r.donates) {
        for (acceptor_pos, acceptor_record) in capable_atoms(structure, other, |r| r.accepts) {
            let antecedent = antecedent_position(structure, other, acceptor_record);
            if donor_validates(
                structure,
                key,
                donor_record,
                &donor_pos,
                &acceptor_pos,
                antecedent.as_ref(),
            ) {
                if let Some(cell) = quantize(&acceptor_pos) {
                    grids.partner_to_donate.increment(cell);
                    recorded += 1;
                }
            }
        }
    }
    recorded
}

/// Key side-chain acceptors against the other residue's side-chain donors;
/// confirmed partner donor atoms go into `partnertoaccept`.
fn record_sidechain_acceptor_bonds(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    let mut recorded = 0;
    for (acceptor_pos, acceptor_record) in capable_atoms(structure, key, |r| r.accepts) {
        let antecedent = antecedent_position(structure, key, acceptor_record);
        for (donor_pos, donor_record) in capable_atoms(structure, other, |r| r.donates) {
            if donor_validates(
                structure,
                other,
                donor_record,
                &donor_pos,
                &acceptor_pos,
                antecedent.as_ref(),
            ) {
                if let Some(cell) = quantize(&donor_pos) {
                    grids.partner_to_accept.increment(cell);
                    recorded += 1;
                }
            }
        }
    }
    recorded
}

/// Key side-chain donors against the other residue's backbone carbonyl.
fn record_donors_to_mainchain(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    let Some(acceptor_pos) = structure.atom_position(other, "O") else {
        return 0;
    };
    let antecedent = structure.atom_position(other, "C");

    let mut recorded = 0;
    for (donor_pos, donor_record) in capable_atoms(structure, key, |r| r.donates) {
        if donor_validates(
            structure,
            key,
            donor_record,
            &donor_pos,
            &acceptor_pos,
            antecedent.as_ref(),
        ) {
            if let Some(cell) = quantize(&acceptor_pos) {
                grids.partner_to_donate.increment(cell);
                recorded += 1;
            }
        }
    }
    recorded
}

/// Key side-chain acceptors against the other residue's backbone amide.
fn record_acceptors_from_mainchain(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    if structure.residue(other).is_some_and(|r| r.name == "PRO") {
        return 0;
    }
    let Some(donor_pos) = structure.atom_position(other, "N") else {
        return 0;
    };
    let hydrogen = structure.atom_position(other, "H");

    let mut recorded = 0;
    for (acceptor_pos, acceptor_record) in capable_atoms(structure, key, |r| r.accepts) {
        let antecedent = antecedent_position(structure, key, acceptor_record);
        if valid_hbond(
            hydrogen.as_ref(),
            &donor_pos,
            &acceptor_pos,
            antecedent.as_ref(),
        ) {
            if let Some(cell) = quantize(&donor_pos) {
                grids.partner_to_accept.increment(cell);
                recorded += 1;
            }
        }
    }
    recorded
}

/// Key backbone amide as the donor against the other residue's side-chain
/// acceptors.
fn record_mainchain_donor_bonds(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    let Some(donor_pos) = structure.atom_position(key, "N") else {
        return 0;
    };
    let hydrogen = structure.atom_position(key, "H");

    let mut recorded = 0;
    for (acceptor_pos, acceptor_record) in capable_atoms(structure, other, |r| r.accepts) {
        let antecedent = antecedent_position(structure, other, acceptor_record);
        if valid_hbond(
            hydrogen.as_ref(),
            &donor_pos,
            &acceptor_pos,
            antecedent.as_ref(),
        ) {
            if let Some(cell) = quantize(&acceptor_pos) {
                grids.partner_to_donate.increment(cell);
                recorded += 1;
            }
        }
    }
    recorded
}

/// Key backbone carbonyl as the acceptor against the other residue's
/// side-chain donors.
fn record_mainchain_acceptor_bonds(
    structure: &StructureModel,
    key: ResidueId,
    other: ResidueId,
    grids: &mut GridSet,
) -> usize {
    let Some(acceptor_pos) = structure.atom_position(key, "O") else {
        return 0;
    };
    let antecedent = structure.atom_position(key, "C");

    let mut recorded = 0;
    for (donor_pos, donor_record) in capable_atoms(structure, other, |r| r.donates) {
        if donor_validates(
            structure,
            other,
            donor_record,
            &donor_pos,
            &acceptor_pos,
            antecedent.as_ref(),
        ) {
            if let Some(cell) = quantize(&donor_pos) {
                grids.partner_to_accept.increment(cell);
                recorded += 1;
            }
        }
    }
    recorded
}

/// The residue's hydrogen-bond-capable atoms selected by a record predicate,
/// with their current positions.
fn capable_atoms<'a>(
    structure: &'a StructureModel,
    residue_id: ResidueId,
    select: impl Fn(&HBondRecord) -> bool + 'a,
) -> Vec<(Point3<f64>, &'static HBondRecord)> {
    let Some(residue) = structure.residue(residue_id) else {
        return Vec::new();
    };
    table::records_for(&residue.name)
        .iter()
        .filter(|record| select(record))
        .filter_map(|record| {
            prefix_atom_position(structure, residue_id, record.atom).map(|pos| (pos, record))
        })
        .collect()
}

/// Position of the first atom whose name matches the record's three-char
/// prefix convention.
fn prefix_atom_position(
    structure: &StructureModel,
    residue_id: ResidueId,
    record_atom: &str,
) -> Option<Point3<f64>> {
    let residue = structure.residue(residue_id)?;
    residue.atoms().iter().find_map(|&atom_id| {
        let atom = structure.atom(atom_id)?;
        let mut a = record_atom.chars();
        let mut b = atom.name.trim().chars();
        for _ in 0..3 {
            if a.next() != b.next() {
                return None;
            }
        }
        Some(atom.position)
    })
}

fn antecedent_position(
    structure: &StructureModel,
    residue_id: ResidueId,
    record: &HBondRecord,
) -> Option<Point3<f64>> {
    record
        .antecedent
        .and_then(|name| structure.atom_position(residue_id, name))
}

/// Validates a donor-side bond with whichever of the record's hydrogens are
/// actually present; when none are listed or none are present, the validity
/// test falls back to its hydrogen-free criteria.
fn donor_validates(
    structure: &StructureModel,
    donor_residue: ResidueId,
    donor_record: &HBondRecord,
    donor_pos: &Point3<f64>,
    acceptor_pos: &Point3<f64>,
    antecedent: Option<&Point3<f64>>,
) -> bool {
    let hydrogens: Vec<Point3<f64>> = donor_record
        .donor_hydrogens
        .iter()
        .filter_map(|&name| structure.atom_position(donor_residue, name))
        .collect();

    if hydrogens.is_empty() {
        valid_hbond(None, donor_pos, acceptor_pos, antecedent)
    } else {
        hydrogens
            .iter()
            .any(|h| valid_hbond(Some(h), donor_pos, acceptor_pos, antecedent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;
    use crate::core::models::atom::Atom;

    /// A serine whose OG donates to an asparagine OD1 2.8 A away, with a
    /// leucine bystander far off to the side.
    fn bonded_structure() -> StructureModel {
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
            // OD1 sits 2.8 A from the serine OG, with CG directly behind it;
            // ND2 points away, out of bonding range.
            ("CG", [2.24, -1.18, 1.05]),
            ("OD1", [0.94, -1.18, 1.05]),
            ("ND2", [3.0, 0.2, 1.0]),
        ] {
            structure
                .add_atom_to_residue(asn, Atom::new(name, asn, Point3::from(pos)))
                .unwrap();
        }

        let leu = structure.add_residue(chain, 40, ' ', "LEU").unwrap();
        for (name, pos) in [
            ("N", [11.0, 11.0, 0.0]),
            ("CA", [12.4, 11.0, 0.0]),
            ("C", [13.0, 12.4, 0.0]),
            ("CB", [12.9, 10.2, 1.2]),
        ] {
            structure
                .add_atom_to_residue(leu, Atom::new(name, leu, Point3::from(pos)))
                .unwrap();
        }

        structure
    }

    #[test]
    fn sidechain_pass_records_self_and_partner_cells() {
        let mut structure = bonded_structure();
        let mut grids = GridSet::new();

        let stats = accumulate_structure(
            &mut structure,
            "SER",
            BuildMode::SidechainSidechain,
            &mut grids,
        );

        assert_eq!(stats.residues_seen, 1);
        assert_eq!(stats.residues_oriented, 1);
        // The serine OG is both a donor and an acceptor.
        assert_eq!(grids.donate.total(), 1);
        assert_eq!(grids.accept.total(), 1);
        // Exactly one confirmed pairing: OG donating to the ASN OD1.
        assert_eq!(stats.bonds_recorded, 1);
        assert_eq!(grids.partner_to_donate.total(), 1);
        assert_eq!(grids.partner_to_accept.total(), 0);
    }

    #[test]
    fn residues_of_other_types_are_ignored() {
        let mut structure = bonded_structure();
        let mut grids = GridSet::new();

        let stats = accumulate_structure(
            &mut structure,
            "TYR",
            BuildMode::SidechainSidechain,
            &mut grids,
        );

        assert_eq!(stats, AccumulationStats::default());
        for kind in GridKind::ALL {
            assert_eq!(grids.grid(kind).total(), 0);
        }
    }

    #[test]
    fn unorientable_residues_are_skipped_not_fatal() {
        let mut structure = StructureModel::new();
        let chain = structure.add_chain('A');
        // A serine with no CB cannot be put into the side-chain frame.
        let ser = structure.add_residue(chain, 1, ' ', "SER").unwrap();
        for (name, pos) in [("N", [1.46, 0.0, 0.0]), ("CA", [0.0, 0.0, 0.0])] {
            structure
                .add_atom_to_residue(ser, Atom::new(name, ser, Point3::from(pos)))
                .unwrap();
        }

        let mut grids = GridSet::new();
        let stats = accumulate_structure(
            &mut structure,
            "SER",
            BuildMode::SidechainSidechain,
            &mut grids,
        );
        assert_eq!(stats.residues_seen, 1);
        assert_eq!(stats.residues_oriented, 0);
    }

    #[test]
    fn mainchain_acceptor_pass_stores_the_carbonyl_oxygen() {
        let mut structure = bonded_structure();
        let mut grids = GridSet::new();

        // Give the serine a carbonyl oxygen so the CaCO frame exists.
        let ser = structure
            .find_residue(&crate::core::models::residue::ResidueSpec::new('A', 1, ' '))
            .unwrap();
        structure
            .add_atom_to_residue(ser, Atom::new("O", ser, Point3::new(-1.75, 1.6, 0.2)))
            .unwrap();

        let stats = accumulate_structure(
            &mut structure,
            "SER",
            BuildMode::MainchainAcceptor,
            &mut grids,
        );

        assert_eq!(stats.residues_oriented, 1);
        assert_eq!(grids.accept.total(), 1);
        assert_eq!(grids.donate.total(), 0);
    }

    #[test]
    fn mainchain_donor_pass_requires_a_bonded_predecessor() {
        let mut structure = bonded_structure();
        let mut grids = GridSet::new();

        // The ASN at position 20 has no residue bonded before it.
        let stats = accumulate_structure(
            &mut structure,
            "ASN",
            BuildMode::MainchainDonor,
            &mut grids,
        );
        assert_eq!(stats.residues_seen, 1);
        assert_eq!(stats.residues_oriented, 0);
        assert_eq!(grids.donate.total(), 0);
    }

    #[test]
    fn build_mode_labels_round_trip() {
        for mode in [
            BuildMode::SidechainSidechain,
            BuildMode::SidechainMainchain,
            BuildMode::MainchainDonor,
            BuildMode::MainchainAcceptor,
        ] {
            assert_eq!(mode.label().parse::<BuildMode>(), Ok(mode));
        }
        assert!("backbone".parse::<BuildMode>().is_err());
    }
}
