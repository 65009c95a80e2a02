//! Hydrogen-bond chemistry: the static per-residue-type donor/acceptor table
//! and the geometric validity predicate used during corpus accumulation.

pub mod table;
pub mod validity;
