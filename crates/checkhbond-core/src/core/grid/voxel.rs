use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Grid divisions per Angstrom.
const DIV_PER_ANGSTROM: usize = 2;
/// Maximum Calpha-to-Calpha distance (A) a hydrogen bond is modeled across.
const MAX_CA_HBOND_DIST: usize = 15;

/// Cells per axis. The cube covers `[-15 A, +15 A)` on every axis.
pub const GRID_SIZE: usize = 2 * MAX_CA_HBOND_DIST * DIV_PER_ANGSTROM;
/// Real-space width of one cell in Angstroms.
pub const GRID_SPACING: f64 = 1.0 / DIV_PER_ANGSTROM as f64;
/// Index of the cell containing the frame origin.
pub const GRID_OFFSET: i64 = (GRID_SIZE / 2) as i64;

/// A validated cell address; constructing one proves all three axes are
/// within `[0, GRID_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridIndex {
    /// Builds an index from possibly out-of-range signed coordinates.
    /// Returns `None` when any axis falls outside the cube.
    pub fn from_signed(x: i64, y: i64, z: i64) -> Option<Self> {
        let range = 0..GRID_SIZE as i64;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Some(Self {
                x: x as usize,
                y: y as usize,
                z: z as usize,
            })
        } else {
            None
        }
    }
}

/// Quantizes one real coordinate to a signed cell index (possibly outside the
/// cube).
#[inline]
pub fn quantize_axis(coordinate: f64) -> i64 {
    (coordinate / GRID_SPACING).floor() as i64 + GRID_OFFSET
}

/// Quantizes a real-space point to a cell address, or `None` when the point
/// lies outside the covered cube.
pub fn quantize(point: &Point3<f64>) -> Option<GridIndex> {
    GridIndex::from_signed(
        quantize_axis(point.x),
        quantize_axis(point.y),
        quantize_axis(point.z),
    )
}

/// Recovers the real-space center of a cell.
pub fn dequantize(index: GridIndex) -> Point3<f64> {
    let axis = |i: usize| (i as i64 - GRID_OFFSET) as f64 * GRID_SPACING + GRID_SPACING / 2.0;
    Point3::new(axis(index.x), axis(index.y), axis(index.z))
}

/// One fixed-size cube of non-negative occurrence counts.
#[derive(Clone)]
pub struct VoxelGrid {
    cells: Box<[u32]>,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("occupied_cells", &self.occupied().count())
            .finish()
    }
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![0; GRID_SIZE * GRID_SIZE * GRID_SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    fn offset(index: GridIndex) -> usize {
        (index.x * GRID_SIZE + index.y) * GRID_SIZE + index.z
    }

    pub fn count(&self, index: GridIndex) -> u32 {
        self.cells[Self::offset(index)]
    }

    pub fn increment(&mut self, index: GridIndex) {
        self.cells[Self::offset(index)] += 1;
    }

    pub fn set_count(&mut self, index: GridIndex, count: u32) {
        self.cells[Self::offset(index)] = count;
    }

    pub fn clear_cell(&mut self, index: GridIndex) {
        self.cells[Self::offset(index)] = 0;
    }

    /// Sum over the whole cube. Recomputed on demand rather than maintained
    /// incrementally; callers snapshot it once per matching pass.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Occupied cells in ascending x, then y, then z order. Matching relies
    /// on this order for deterministic tie-breaks.
    pub fn occupied(&self) -> impl Iterator<Item = (GridIndex, u32)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, &count)| {
            if count == 0 {
                return None;
            }
            let z = i % GRID_SIZE;
            let y = (i / GRID_SIZE) % GRID_SIZE;
            let x = i / (GRID_SIZE * GRID_SIZE);
            Some((GridIndex { x, y, z }, count))
        })
    }

    pub fn reset(&mut self) {
        self.cells.fill(0);
    }
}

/// Which of the four per-pass distributions a grid holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridKind {
    /// The key residue's own hydrogen-donor heavy atoms.
    Donate,
    /// The key residue's own hydrogen-acceptor atoms.
    Accept,
    /// Partner acceptor atoms observed bonding to the key's donors.
    PartnerToDonate,
    /// Partner donor atoms observed bonding to the key's acceptors.
    PartnerToAccept,
}

impl GridKind {
    pub const ALL: [GridKind; 4] = [
        GridKind::Donate,
        GridKind::Accept,
        GridKind::PartnerToDonate,
        GridKind::PartnerToAccept,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GridKind::Donate => "donate",
            GridKind::Accept => "accept",
            GridKind::PartnerToDonate => "partnertodonate",
            GridKind::PartnerToAccept => "partnertoaccept",
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GridKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donate" => Ok(GridKind::Donate),
            "accept" => Ok(GridKind::Accept),
            "partnertodonate" => Ok(GridKind::PartnerToDonate),
            "partnertoaccept" => Ok(GridKind::PartnerToAccept),
            _ => Err(()),
        }
    }
}

/// The four grids of one residue-type pass, owned together so a pass can be
/// reset wholesale before the next type is processed.
#[derive(Debug, Clone, Default)]
pub struct GridSet {
    pub donate: VoxelGrid,
    pub accept: VoxelGrid,
    pub partner_to_donate: VoxelGrid,
    pub partner_to_accept: VoxelGrid,
}

impl GridSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self, kind: GridKind) -> &VoxelGrid {
        match kind {
            GridKind::Donate => &self.donate,
            GridKind::Accept => &self.accept,
            GridKind::PartnerToDonate => &self.partner_to_donate,
            GridKind::PartnerToAccept => &self.partner_to_accept,
        }
    }

    pub fn grid_mut(&mut self, kind: GridKind) -> &mut VoxelGrid {
        match kind {
            GridKind::Donate => &mut self.donate,
            GridKind::Accept => &mut self.accept,
            GridKind::PartnerToDonate => &mut self.partner_to_donate,
            GridKind::PartnerToAccept => &mut self.partner_to_accept,
        }
    }

    pub fn reset(&mut self) {
        for kind in GridKind::ALL {
            self.grid_mut(kind).reset();
        }
    }
}
