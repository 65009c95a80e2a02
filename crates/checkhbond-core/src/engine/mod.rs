//! Stateful analysis layer: the grid matcher, the pair analysis that feeds
//! it, steric culling, corpus accumulation, and the shared error, progress,
//! and configuration types.

pub mod analysis;
pub mod builder;
pub mod config;
pub mod culling;
pub mod error;
pub mod matcher;
pub mod progress;
