//! Readers for the inputs of graph construction: coordinate files,
//! conservation tables and per-query target values.

pub mod pdb;
pub mod pssm;
pub mod targets;
pub mod traits;
