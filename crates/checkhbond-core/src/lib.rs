//! # CheckHBond Core Library
//!
//! A library for assessing whether a hydrogen bond observed between two
//! amino-acid residues in a protein structure would be maintained if one of the
//! residues were substituted for another, based on statistical geometry
//! gathered from a reference corpus of high-resolution structures.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`StructureModel`), pure geometry (canonical frame orientation, the
//!   weighted rigid rotation fit), the voxel-grid representation of
//!   hydrogen-bonding-atom distributions, and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates an
//!   analysis: steric culling of the grids, the grid-matching/scoring pass,
//!   corpus accumulation for table building, and the error and progress types
//!   shared by all of them.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties the `engine` and `core` together into the two complete
//!   procedures: checking one structure/substitution pair, and building the
//!   statistical grid tables from a structure corpus.

pub mod core;
pub mod engine;
pub mod workflows;
