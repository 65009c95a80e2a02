use phf::{Map, Set, phf_map, phf_set};

/// One hydrogen-bonding-capable heavy atom of a residue type.
///
/// `selected` marks the single entry per residue type that drives a build
/// pass, so a type with several capable atoms is still processed once.
/// Donor hydrogens are listed where the hydrogen position is unambiguous;
/// rotatable or symmetric groups leave them empty and the validity test
/// falls back to its distance-only criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HBondRecord {
    pub atom: &'static str,
    pub selected: bool,
    pub accepts: bool,
    pub donates: bool,
    pub donor_hydrogens: &'static [&'static str],
    pub antecedent: Option<&'static str>,
}

const fn record(
    atom: &'static str,
    selected: bool,
    accepts: bool,
    donates: bool,
    donor_hydrogens: &'static [&'static str],
    antecedent: Option<&'static str>,
) -> HBondRecord {
    HBondRecord {
        atom,
        selected,
        accepts,
        donates,
        donor_hydrogens,
        antecedent,
    }
}

static SIDECHAIN_RECORDS: Map<&'static str, &'static [HBondRecord]> = phf_map! {
    "ARG" => &[
        record("NE", true, false, true, &["HE"], None),
        record("NH1", false, false, true, &[], None),
        record("NH2", false, false, true, &[], None),
    ],
    "THR" => &[record("OG1", true, true, true, &[], Some("CB"))],
    "ASN" => &[
        record("ND2", true, false, true, &[], Some("CG")),
        record("OD1", false, true, false, &[], Some("CG")),
    ],
    "ASP" => &[
        record("OD1", true, true, false, &[], Some("CG")),
        record("OD2", false, true, false, &[], Some("CG")),
    ],
    "GLU" => &[
        record("OE1", true, true, false, &[], Some("CD")),
        record("OE2", false, true, false, &[], Some("CD")),
    ],
    "GLN" => &[
        record("NE2", true, false, true, &[], Some("CD")),
        record("OE1", false, true, false, &[], Some("CD")),
    ],
    "LYS" => &[record("NZ", true, false, true, &[], None)],
    "SER" => &[record("OG", true, true, true, &[], Some("CB"))],
    "TRP" => &[record("NE1", true, false, true, &["HE1"], None)],
    "TYR" => &[record("OH", true, true, true, &[], Some("CZ"))],
    "HIS" => &[
        record("ND1", true, true, true, &["HD1"], Some("CG")),
        record("NE2", false, true, true, &["HE2"], Some("CD2")),
    ],
};

/// Residue types with no side-chain hydrogen-bonding atoms; they participate
/// only through backbone N-H and C=O.
static BACKBONE_ONLY_TYPES: Set<&'static str> = phf_set! {
    "ALA", "CYS", "PHE", "GLY", "ILE", "LEU", "MET", "VAL", "PRO",
};

/// Residue types the query tool refuses as key or substitute types.
static QUERY_EXCLUDED_TYPES: Set<&'static str> = phf_set! {
    "MET", "CYS", "HIS",
};

/// Side-chain donor/acceptor records for a residue type. Empty for
/// backbone-only and unknown types.
pub fn records_for(residue_name: &str) -> &'static [HBondRecord] {
    SIDECHAIN_RECORDS
        .get(residue_name.trim())
        .copied()
        .unwrap_or(&[])
}

/// Atom names are compared on their first three characters, the way the
/// source structure format truncates them.
fn atom_name_matches(record_atom: &str, atom_name: &str) -> bool {
    let mut a = record_atom.chars();
    let mut b = atom_name.trim().chars();
    for _ in 0..3 {
        if a.next() != b.next() {
            return false;
        }
    }
    true
}

/// Looks up the donor record for a named atom of a residue type.
pub fn donor_record(residue_name: &str, atom_name: &str) -> Option<&'static HBondRecord> {
    records_for(residue_name)
        .iter()
        .find(|r| r.donates && atom_name_matches(r.atom, atom_name))
}

/// Looks up the acceptor record for a named atom of a residue type.
pub fn acceptor_record(residue_name: &str, atom_name: &str) -> Option<&'static HBondRecord> {
    records_for(residue_name)
        .iter()
        .find(|r| r.accepts && atom_name_matches(r.atom, atom_name))
}

/// True when the residue type may appear in a substitution query.
pub fn is_query_capable(residue_name: &str) -> bool {
    !QUERY_EXCLUDED_TYPES.contains(residue_name.trim())
}

/// Residue types a side-chain build pass iterates: one selected record with
/// side-chain donor or acceptor capability.
pub fn sidechain_build_types() -> impl Iterator<Item = &'static str> {
    let mut types: Vec<&'static str> = SIDECHAIN_RECORDS
        .entries()
        .filter(|(_, records)| {
            records
                .iter()
                .any(|r| r.selected && (r.accepts || r.donates))
        })
        .map(|(&name, _)| name)
        .collect();
    types.sort_unstable();
    types.into_iter()
}

/// Residue types a main-chain build pass iterates: every standard type,
/// side-chain-capable or not.
pub fn mainchain_build_types() -> impl Iterator<Item = &'static str> {
    let mut types: Vec<&'static str> = SIDECHAIN_RECORDS
        .keys()
        .chain(BACKBONE_ONLY_TYPES.iter())
        .copied()
        .collect();
    types.sort_unstable();
    types.into_iter()
}
