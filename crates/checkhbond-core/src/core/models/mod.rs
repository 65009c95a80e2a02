//! # Core Models Module
//!
//! Fundamental data structures representing a protein structure in memory:
//! atoms, residues, chains, and the [`structure::StructureModel`] that owns
//! them. The model is deliberately minimal (names, identities, and 3-D
//! positions) because the analysis only ever reads atom names and reads or
//! rigidly transforms atom positions.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with its name and coordinates
//! - [`residue`] - Amino acid residue identity and atom membership
//! - [`chain`] - Polypeptide chain organization
//! - [`structure`] - Complete structure with ordered residues and transforms
//! - [`ids`] - Unique identifier types for atoms, residues, and chains

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod structure;
