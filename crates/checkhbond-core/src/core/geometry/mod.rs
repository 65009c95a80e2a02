//! Geometry layer: angle/rotation primitives, the canonical residue frame
//! orientation procedure, and the weighted rotation-only rigid fit.

pub mod fit;
pub mod orientation;
pub mod primitives;
