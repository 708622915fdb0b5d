//! # rankgraph Core Library
//!
//! Turns protein structures into feature-annotated graphs for learning to
//! rank protein-protein interfaces and single-residue variants.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`,
//!   `PssmTable`), structure and conservation readers, the generic graph and
//!   feature schema, grid projection, and the keyed tensor container.
//!
//! - **[`engine`]: The Logic Core.** Queries that select entities around a
//!   variant or across an interface, contact detection, and the feature
//!   callback registry that populates nodes.
//!
//! - **[`workflows`]: The Public API.** Runs lists of queries and exports the
//!   resulting graphs (and grids) into one container file.

pub mod core;
pub mod engine;
pub mod workflows;
