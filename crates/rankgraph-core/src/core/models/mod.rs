//! # Core Models Module
//!
//! In-memory representation of a parsed protein structure.
//!
//! - [`system`] - [`MolecularSystem`](system::MolecularSystem), the slotmap-backed owner of all chains, residues and atoms
//! - [`chain`], [`residue`], [`atom`] - The structural hierarchy
//! - [`amino_acid`] - The twenty standard amino acids and their physicochemical properties
//! - [`pssm`] - Per-chain conservation profiles
//! - [`ids`] - Stable handles for atoms, residues, and chains
//!
//! ```ignore
//! use rankgraph::core::models::{system::MolecularSystem, atom::Atom, chain::ChainType};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::Protein);
//! let residue_id = system.add_residue(chain_id, ResidueNumber::new(1), "ALA").unwrap();
//! system.add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()));
//! ```

pub mod amino_acid;
pub mod atom;
pub mod chain;
pub mod ids;
pub mod pssm;
pub mod residue;
pub mod system;
