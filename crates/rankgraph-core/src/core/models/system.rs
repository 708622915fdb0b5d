use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::pssm::PssmTable;
use super::residue::{Residue, ResidueNumber};
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::HashMap;

/// A parsed structure: chains, residues and atoms with stable handles.
///
/// Chains and residues are looked up by their file identifiers (chain letter,
/// residue number with insertion code) through internal maps, while all
/// cross-references use slotmap keys.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// Lookup map for finding residues by chain and residue number.
    residue_id_map: HashMap<(ChainId, ResidueNumber), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Chain identifiers in the order they were first seen.
    chain_order: Vec<ChainId>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Iterates chains in the order they appeared in the source file.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Finds a chain ID by its single-character identifier.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue by chain handle and residue number.
    pub fn find_residue(&self, chain_id: ChainId, number: ResidueNumber) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, number)).copied()
    }

    /// Adds a new chain or returns the existing one with the same identifier.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue or returns the existing one with the same number.
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: ResidueNumber,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, number);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(number, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a residue.
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        let atom_id = self.atoms.insert(atom);
        self.residues.get_mut(residue_id)?.add_atom(atom_id);
        Some(atom_id)
    }

    /// Attaches a conservation profile to a chain. Returns `false` if the chain is unknown.
    pub fn attach_pssm(&mut self, chain: char, pssm: PssmTable) -> bool {
        match self
            .find_chain_by_id(chain)
            .and_then(|id| self.chains.get_mut(id))
        {
            Some(chain) => {
                chain.set_pssm(pssm);
                true
            }
            None => false,
        }
    }

    pub fn residue_atom_positions(&self, residue_id: ResidueId) -> Vec<Point3<f64>> {
        self.residues
            .get(residue_id)
            .map(|residue| {
                residue
                    .atoms()
                    .iter()
                    .filter_map(|&id| self.atoms.get(id).map(|atom| atom.position))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Arithmetic mean of the residue's atom positions, `None` for an empty residue.
    pub fn residue_centroid(&self, residue_id: ResidueId) -> Option<Point3<f64>> {
        crate::core::utils::geometry::centroid(&self.residue_atom_positions(residue_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRefs {
        chain_a_id: ChainId,
        gly_id: ResidueId,
        gly_n_id: AtomId,
        ala_id: ResidueId,
    }

    fn create_standard_test_system() -> (MolecularSystem, TestRefs) {
        let mut system = MolecularSystem::new();
        let chain_a_id = system.add_chain('A', ChainType::Protein);

        let gly_id = system
            .add_residue(chain_a_id, ResidueNumber::new(1), "GLY")
            .unwrap();
        let gly_n_id = system
            .add_atom_to_residue(gly_id, Atom::new("N", gly_id, Point3::new(0.0, 0.0, 0.0)))
            .unwrap();
        system
            .add_atom_to_residue(gly_id, Atom::new("CA", gly_id, Point3::new(2.0, 0.0, 0.0)))
            .unwrap();

        let ala_id = system
            .add_residue(chain_a_id, ResidueNumber::with_insertion_code(1, 'A'), "ALA")
            .unwrap();
        system
            .add_atom_to_residue(ala_id, Atom::new("CA", ala_id, Point3::new(2.0, 1.0, 0.0)))
            .unwrap();

        let refs = TestRefs {
            chain_a_id,
            gly_id,
            gly_n_id,
            ala_id,
        };
        (system, refs)
    }

    #[test]
    fn system_creation_and_access() {
        let (system, refs) = create_standard_test_system();

        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.chain(refs.chain_a_id).unwrap().residues().len(), 2);
        assert_eq!(system.chains_iter().count(), 1);
        assert!(system.find_chain_by_id('B').is_none());
        assert_eq!(system.residue(refs.gly_id).unwrap().name, "GLY");
        assert_eq!(system.atom(refs.gly_n_id).unwrap().name, "N");
    }

    #[test]
    fn residues_with_insertion_codes_are_distinct() {
        let (system, refs) = create_standard_test_system();
        assert_eq!(
            system.find_residue(refs.chain_a_id, ResidueNumber::new(1)),
            Some(refs.gly_id)
        );
        assert_eq!(
            system.find_residue(refs.chain_a_id, ResidueNumber::with_insertion_code(1, 'A')),
            Some(refs.ala_id)
        );
        assert!(
            system
                .find_residue(refs.chain_a_id, ResidueNumber::with_insertion_code(1, 'B'))
                .is_none()
        );
    }

    #[test]
    fn add_chain_and_residue_are_idempotent() {
        let (mut system, refs) = create_standard_test_system();
        assert_eq!(system.add_chain('A', ChainType::Protein), refs.chain_a_id);
        let again = system
            .add_residue(refs.chain_a_id, ResidueNumber::new(1), "GLY")
            .unwrap();
        assert_eq!(again, refs.gly_id);
        assert_eq!(system.chain(refs.chain_a_id).unwrap().residues().len(), 2);
    }

    #[test]
    fn chains_iterate_in_insertion_order() {
        let mut system = MolecularSystem::new();
        system.add_chain('H', ChainType::Protein);
        system.add_chain('L', ChainType::Protein);
        system.add_chain('A', ChainType::Protein);
        let letters: String = system.chains_iter().map(|(_, c)| c.id).collect();
        assert_eq!(letters, "HLA");
    }

    #[test]
    fn residue_centroid_averages_atom_positions() {
        let (system, refs) = create_standard_test_system();
        let centroid = system.residue_centroid(refs.gly_id).unwrap();
        assert!((centroid - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn attach_pssm_targets_existing_chain_only() {
        let (mut system, refs) = create_standard_test_system();
        assert!(system.attach_pssm('A', PssmTable::new()));
        assert!(!system.attach_pssm('Z', PssmTable::new()));
        assert!(system.chain(refs.chain_a_id).unwrap().pssm().is_some());
    }
}
