use crate::core::graph::contact::EdgeType;
use crate::core::models::ids::{AtomId, ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::min_distance;
use crate::core::utils::identifiers::is_disulfide_sulfur;
use itertools::Itertools;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Distance thresholds for atom-level contacts, in Ångström.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AtomicCutoffs {
    /// Any pair closer than this becomes an edge.
    pub nonbonded: f64,
    /// Pairs closer than this are treated as covalently bonded.
    pub bonded: f64,
    /// Gamma-sulfur pairs closer than this form a disulfide bond.
    pub disulfide: f64,
}

impl Default for AtomicCutoffs {
    fn default() -> Self {
        Self {
            nonbonded: 4.5,
            bonded: 1.6,
            disulfide: 2.2,
        }
    }
}

impl AtomicCutoffs {
    pub fn classify(&self, name1: &str, name2: &str, distance: f64) -> Option<EdgeType> {
        if distance >= self.nonbonded {
            return None;
        }
        let disulfide =
            is_disulfide_sulfur(name1) && is_disulfide_sulfur(name2) && distance < self.disulfide;
        if distance < self.bonded || disulfide {
            Some(EdgeType::Internal)
        } else {
            Some(EdgeType::Interface)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomContact {
    pub first: AtomId,
    pub second: AtomId,
    pub distance: f64,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueContact {
    pub first: ResidueId,
    pub second: ResidueId,
    pub distance: f64,
    pub edge_type: EdgeType,
}

/// All atom pairs among `atoms` closer than the nonbonded cutoff.
///
/// Each unordered pair is reported once, in the order the atoms were given.
pub fn atomic_contacts(
    system: &MolecularSystem,
    atoms: &[AtomId],
    cutoffs: &AtomicCutoffs,
) -> Vec<AtomContact> {
    let resolved: Vec<_> = atoms
        .iter()
        .filter_map(|&id| system.atom(id).map(|atom| (id, atom)))
        .collect();

    resolved
        .iter()
        .tuple_combinations()
        .filter_map(|((id1, atom1), (id2, atom2))| {
            let distance = nalgebra::distance(&atom1.position, &atom2.position);
            cutoffs
                .classify(&atom1.name, &atom2.name, distance)
                .map(|edge_type| AtomContact {
                    first: *id1,
                    second: *id2,
                    distance,
                    edge_type,
                })
        })
        .collect()
}

/// Minimum atom-atom distance between two residues.
pub fn residue_distance(system: &MolecularSystem, a: ResidueId, b: ResidueId) -> Option<f64> {
    min_distance(
        &system.residue_atom_positions(a),
        &system.residue_atom_positions(b),
    )
}

fn chain_residue_positions(
    system: &MolecularSystem,
    chain_id: ChainId,
) -> Vec<(ResidueId, Vec<Point3<f64>>)> {
    system
        .chain(chain_id)
        .map(|chain| {
            chain
                .residues()
                .iter()
                .map(|&id| (id, system.residue_atom_positions(id)))
                .filter(|(_, positions)| !positions.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Residue pairs across two chains whose closest atoms are within `cutoff`.
pub fn interface_residue_pairs(
    system: &MolecularSystem,
    chain1: ChainId,
    chain2: ChainId,
    cutoff: f64,
) -> Vec<ResidueContact> {
    let side1 = chain_residue_positions(system, chain1);
    let side2 = chain_residue_positions(system, chain2);

    let mut pairs = Vec::new();
    for (res1, pos1) in &side1 {
        for (res2, pos2) in &side2 {
            if let Some(distance) = min_distance(pos1, pos2).filter(|d| *d < cutoff) {
                pairs.push(ResidueContact {
                    first: *res1,
                    second: *res2,
                    distance,
                    edge_type: EdgeType::Interface,
                });
            }
        }
    }
    pairs
}

/// All pairs of `residues` within `cutoff`; internal when both residues sit on
/// the same chain, interface otherwise.
pub fn residue_contacts(
    system: &MolecularSystem,
    residues: &[ResidueId],
    cutoff: f64,
) -> Vec<ResidueContact> {
    let resolved: Vec<_> = residues
        .iter()
        .filter_map(|&id| {
            let residue = system.residue(id)?;
            Some((id, residue.chain_id, system.residue_atom_positions(id)))
        })
        .collect();

    resolved
        .iter()
        .tuple_combinations()
        .filter(|((id1, _, _), (id2, _, _))| id1 != id2)
        .filter_map(|((id1, chain1, pos1), (id2, chain2, pos2))| {
            let distance = min_distance(pos1, pos2).filter(|d| *d < cutoff)?;
            let edge_type = if chain1 == chain2 {
                EdgeType::Internal
            } else {
                EdgeType::Interface
            };
            Some(ResidueContact {
                first: *id1,
                second: *id2,
                distance,
                edge_type,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::models::residue::ResidueNumber;

    fn add_residue(
        system: &mut MolecularSystem,
        chain: char,
        number: isize,
        name: &str,
        atoms: &[(&str, [f64; 3])],
    ) -> ResidueId {
        let chain_id = system.add_chain(chain, ChainType::Protein);
        let residue_id = system
            .add_residue(chain_id, ResidueNumber::new(number), name)
            .unwrap();
        for (atom_name, [x, y, z]) in atoms {
            system
                .add_atom_to_residue(residue_id, Atom::new(atom_name, residue_id, Point3::new(*x, *y, *z)))
                .unwrap();
        }
        residue_id
    }

    #[test]
    fn atomic_contacts_follow_cutoff_rules() {
        let mut system = MolecularSystem::new();
        add_residue(
            &mut system,
            'A',
            1,
            "CYS",
            &[("CA", [0.0, 0.0, 0.0]), ("CB", [1.5, 0.0, 0.0]), ("SG", [3.0, 0.0, 0.0])],
        );
        add_residue(
            &mut system,
            'A',
            9,
            "CYS",
            &[("SG", [5.0, 0.0, 0.0]), ("CA", [20.0, 0.0, 0.0])],
        );
        let atoms: Vec<AtomId> = system.atoms_iter().map(|(id, _)| id).collect();
        let cutoffs = AtomicCutoffs::default();
        let contacts = atomic_contacts(&system, &atoms, &cutoffs);

        for contact in &contacts {
            assert_ne!(contact.first, contact.second);
            assert!(contact.distance < cutoffs.nonbonded);
            let name1 = &system.atom(contact.first).unwrap().name;
            let name2 = &system.atom(contact.second).unwrap().name;
            let internal = contact.distance < cutoffs.bonded
                || (name1 == "SG" && name2 == "SG" && contact.distance < cutoffs.disulfide);
            assert_eq!(contact.edge_type == EdgeType::Internal, internal);
        }
        // CA-CB, CA-SG(1), CB-SG(1), CB-SG(9), SG(1)-SG(9)
        assert_eq!(contacts.len(), 5);
        let ca_cb = contacts.iter().find(|c| (c.distance - 1.5).abs() < 1e-12).unwrap();
        assert_eq!(ca_cb.edge_type, EdgeType::Internal);
    }

    #[test]
    fn gamma_sulfurs_within_disulfide_cutoff_are_internal() {
        let cutoffs = AtomicCutoffs::default();
        assert_eq!(cutoffs.classify("SG", "SG", 2.05), Some(EdgeType::Internal));
        assert_eq!(cutoffs.classify("SG", "CB", 2.05), Some(EdgeType::Interface));
        assert_eq!(cutoffs.classify("SG", "SG", 2.5), Some(EdgeType::Interface));
        assert_eq!(cutoffs.classify("CA", "CA", 4.5), None);
    }

    #[test]
    fn close_residues_on_one_chain_form_one_internal_edge() {
        let mut system = MolecularSystem::new();
        let r1 = add_residue(&mut system, 'A', 1, "ALA", &[("CA", [0.0, 0.0, 0.0])]);
        let r2 = add_residue(&mut system, 'A', 2, "ALA", &[("CA", [3.0, 0.0, 0.0])]);

        let contacts = residue_contacts(&system, &[r1, r2], 3.5);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].edge_type, EdgeType::Internal);
        assert!(
            contacts
                .iter()
                .all(|c| c.edge_type != EdgeType::Interface)
        );
    }

    #[test]
    fn residue_distance_is_the_closest_atom_pair() {
        let mut system = MolecularSystem::new();
        let r1 = add_residue(
            &mut system,
            'A',
            1,
            "LYS",
            &[("CA", [0.0, 0.0, 0.0]), ("NZ", [6.0, 0.0, 0.0])],
        );
        let r2 = add_residue(&mut system, 'B', 1, "ASP", &[("OD1", [8.5, 0.0, 0.0])]);
        assert!((residue_distance(&system, r1, r2).unwrap() - 2.5).abs() < 1e-12);

        let contacts = residue_contacts(&system, &[r1, r2], 3.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].edge_type, EdgeType::Interface);
    }

    #[test]
    fn interface_pairs_only_cross_chains() {
        let mut system = MolecularSystem::new();
        add_residue(&mut system, 'A', 1, "ALA", &[("CA", [0.0, 0.0, 0.0])]);
        add_residue(&mut system, 'A', 2, "ALA", &[("CA", [1.0, 0.0, 0.0])]);
        add_residue(&mut system, 'B', 1, "GLY", &[("CA", [5.0, 0.0, 0.0])]);
        add_residue(&mut system, 'B', 2, "GLY", &[("CA", [50.0, 0.0, 0.0])]);
        let a = system.find_chain_by_id('A').unwrap();
        let b = system.find_chain_by_id('B').unwrap();

        let pairs = interface_residue_pairs(&system, a, b, 8.5);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.edge_type == EdgeType::Interface));
        assert!(interface_residue_pairs(&system, a, b, 2.0).is_empty());
    }
}
