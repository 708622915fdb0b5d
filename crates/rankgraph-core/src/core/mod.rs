//! # Core Module
//!
//! Data structures and stateless algorithms shared by every query.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains, systems and conservation tables
//! - **File I/O** ([`io`]) - PDB structures, PSSM tables and target CSV files
//! - **Utilities** ([`utils`]) - Geometry helpers and atom-name conventions
//! - **Graphs** ([`graph`]) - Entities, contacts, feature values and the feature schema
//! - **Grids** ([`grid`]) - Lattice settings and projection of graph features onto a lattice
//! - **Export** ([`export`]) - The keyed multi-entry tensor container

pub mod export;
pub mod graph;
pub mod grid;
pub mod io;
pub mod models;
pub mod utils;
