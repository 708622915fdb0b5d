//! # Graph Module
//!
//! The node/edge/feature data model shared by graph construction, grid
//! projection and export.
//!
//! - [`entity`] - Atom and residue identities with positions
//! - [`contact`] - Unordered entity pairs and their edge classification
//! - [`feature`] - Feature values, shapes and the per-graph schema
//! - [`graph`] - The graph container itself

pub mod contact;
pub mod entity;
pub mod feature;
pub mod graph;
