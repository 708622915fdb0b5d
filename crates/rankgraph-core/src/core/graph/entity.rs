use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::residue::ResidueNumber;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Granularity of a graph's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Atom,
    Residue,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Atom => write!(f, "atom"),
            NodeKind::Residue => write!(f, "residue"),
        }
    }
}

/// Non-owning handle back into the [`MolecularSystem`] an entity was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityHandle {
    Atom(AtomId),
    Residue(ResidueId),
}

impl EntityHandle {
    pub fn kind(&self) -> NodeKind {
        match self {
            EntityHandle::Atom(_) => NodeKind::Atom,
            EntityHandle::Residue(_) => NodeKind::Residue,
        }
    }
}

/// An atom or residue snapshot with its 3-D position.
///
/// Equality, hashing and ordering use the identity tuple
/// `(kind, chain, residue number, atom name)` only; the position and the handle
/// are carried along but never compared.
#[derive(Debug, Clone)]
pub struct Entity {
    handle: EntityHandle,
    chain: char,
    residue: ResidueNumber,
    atom_name: Option<String>,
    position: Point3<f64>,
}

impl Entity {
    pub fn new(
        handle: EntityHandle,
        chain: char,
        residue: ResidueNumber,
        atom_name: Option<&str>,
        position: Point3<f64>,
    ) -> Self {
        Self {
            handle,
            chain,
            residue,
            atom_name: atom_name.map(str::to_string),
            position,
        }
    }

    /// Snapshot of an atom; `None` if the atom or its residue is unknown.
    pub fn from_atom(system: &MolecularSystem, atom_id: AtomId) -> Option<Self> {
        let atom = system.atom(atom_id)?;
        let residue = system.residue(atom.residue_id)?;
        let chain = system.chain(residue.chain_id)?;
        Some(Self::new(
            EntityHandle::Atom(atom_id),
            chain.id,
            residue.number,
            Some(&atom.name),
            atom.position,
        ))
    }

    /// Snapshot of a residue positioned at its atom centroid; `None` if the
    /// residue is unknown or has no atoms.
    pub fn from_residue(system: &MolecularSystem, residue_id: ResidueId) -> Option<Self> {
        let residue = system.residue(residue_id)?;
        let chain = system.chain(residue.chain_id)?;
        let position = system.residue_centroid(residue_id)?;
        Some(Self::new(
            EntityHandle::Residue(residue_id),
            chain.id,
            residue.number,
            None,
            position,
        ))
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn kind(&self) -> NodeKind {
        self.handle.kind()
    }

    pub fn chain(&self) -> char {
        self.chain
    }

    pub fn residue(&self) -> ResidueNumber {
        self.residue
    }

    pub fn atom_name(&self) -> Option<&str> {
        self.atom_name.as_deref()
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// The residue this entity belongs to (itself for residue entities).
    pub fn residue_id(&self, system: &MolecularSystem) -> Option<ResidueId> {
        match self.handle {
            EntityHandle::Residue(id) => Some(id),
            EntityHandle::Atom(id) => system.atom(id).map(|atom| atom.residue_id),
        }
    }

    fn identity(&self) -> (NodeKind, char, ResidueNumber, Option<&str>) {
        (self.kind(), self.chain, self.residue, self.atom_name.as_deref())
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.atom_name {
            Some(name) => write!(f, "{}:{}:{}", self.chain, self.residue, name),
            None => write!(f, "{}:{}", self.chain, self.residue),
        }
    }
}
