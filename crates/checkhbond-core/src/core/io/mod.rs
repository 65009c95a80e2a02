//! File I/O: structure reading/writing and the persisted grid-table format.

pub mod pdb;
pub mod tables;
pub mod traits;
