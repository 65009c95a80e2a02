//! Fixed-extent voxel grids of hydrogen-bonding-atom occurrence counts, plus
//! the real-space quantization mapping shared by the builder and the matcher.

pub mod voxel;

pub use voxel::{
    GRID_OFFSET, GRID_SIZE, GRID_SPACING, GridIndex, GridKind, GridSet, VoxelGrid, dequantize,
    quantize, quantize_axis,
};
