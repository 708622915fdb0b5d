use super::{Query, finish_graph, insert_edge, load_structure, model_id};
use crate::core::graph::entity::Entity;
use crate::core::graph::graph::Graph;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::engine::config::VariantQueryConfig;
use crate::engine::contacts::atomic_contacts;
use crate::engine::error::EngineError;
use crate::engine::features::registry::{FeatureContext, FeatureRegistry, VariantSite};
use crate::engine::features::variant_features;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Atom-level graph around a single-residue variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantAtomicQuery {
    config: VariantQueryConfig,
}

impl VariantAtomicQuery {
    pub fn new(config: VariantQueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VariantQueryConfig {
        &self.config
    }

    fn variant_residue(&self, system: &MolecularSystem) -> Result<ResidueId, EngineError> {
        let model = model_id(&self.config.pdb_path);
        let chain_id = system
            .find_chain_by_id(self.config.chain)
            .ok_or(EngineError::ChainNotFound {
                model: model.clone(),
                chain: self.config.chain,
            })?;
        system
            .find_residue(chain_id, self.config.residue)
            .ok_or(EngineError::ResidueNotFound {
                model,
                chain: self.config.chain,
                residue: self.config.residue,
            })
    }
}

/// Residues with at least one atom closer than `radius` to any atom of `center`.
pub fn surrounding_residues(
    system: &MolecularSystem,
    center: ResidueId,
    radius: f64,
) -> Vec<ResidueId> {
    let center_positions: Vec<[f64; 3]> = system
        .residue_atom_positions(center)
        .iter()
        .map(|p| [p.x, p.y, p.z])
        .collect();
    if center_positions.is_empty() {
        return Vec::new();
    }

    let kdtree: KdTree<f64, 3> = (&center_positions).into();
    let radius_sq = radius * radius;

    system
        .chains_iter()
        .flat_map(|(_, chain)| chain.residues().iter().copied())
        .filter(|&residue_id| {
            residue_id == center
                || system
                    .residue_atom_positions(residue_id)
                    .iter()
                    .any(|p| {
                        kdtree
                            .nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z])
                            .distance
                            < radius_sq
                    })
        })
        .collect()
}

impl Query for VariantAtomicQuery {
    fn query_id(&self) -> String {
        format!(
            "{}:{}:{}:{}->{}",
            model_id(&self.config.pdb_path),
            self.config.chain,
            self.config.residue,
            self.config.wildtype,
            self.config.variant
        )
    }

    fn load_system(&self) -> Result<MolecularSystem, EngineError> {
        load_structure(&self.config.pdb_path, &self.config.pssm_paths)
    }

    fn default_features(&self) -> Result<FeatureRegistry, EngineError> {
        Ok(variant_features(!self.config.pssm_paths.is_empty())?)
    }

    #[instrument(skip_all, name = "variant_query", fields(query = %self.query_id()))]
    fn build_graph_from_system(
        &self,
        system: &MolecularSystem,
        features: &FeatureRegistry,
    ) -> Result<Graph, EngineError> {
        let variant_residue = self.variant_residue(system)?;
        let residues = surrounding_residues(system, variant_residue, self.config.radius);
        let atoms: Vec<AtomId> = residues
            .iter()
            .filter_map(|&id| system.residue(id))
            .flat_map(|residue| residue.atoms().iter().copied())
            .collect();
        debug!(
            residues = residues.len(),
            atoms = atoms.len(),
            "Selected atoms around variant"
        );

        let contacts = atomic_contacts(system, &atoms, &self.config.cutoffs);
        let mut entities: HashMap<AtomId, Entity> = HashMap::new();
        let mut graph = Graph::new(self.query_id());
        for contact in &contacts {
            for id in [contact.first, contact.second] {
                if !entities.contains_key(&id) {
                    if let Some(entity) = Entity::from_atom(system, id) {
                        entities.insert(id, entity);
                    }
                }
            }
            let (Some(first), Some(second)) =
                (entities.get(&contact.first), entities.get(&contact.second))
            else {
                continue;
            };
            insert_edge(
                &mut graph,
                first.clone(),
                second.clone(),
                contact.distance,
                contact.edge_type,
            )?;
        }

        let chain_codes = BTreeMap::from([(self.config.chain, 0.0)]);
        let context = FeatureContext {
            system,
            variant: Some(VariantSite {
                residue: variant_residue,
                wildtype: self.config.wildtype,
                variant: self.config.variant,
            }),
            chain_codes: &chain_codes,
        };
        finish_graph(graph, features, &context, &self.config.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::entity::NodeKind;
    use crate::core::graph::feature::FeatureValue;
    use crate::core::models::amino_acid::AminoAcid;
    use crate::core::models::residue::ResidueNumber;
    use crate::engine::config::VariantQueryBuilder;
    use crate::engine::features::{CONSERVATION, CONSERVATION_DIFFERENCE, EDGE_TYPE, VARIANT};
    use crate::engine::query::test_support::{write_complex, write_pssm};
    use std::path::Path;

    fn query(pdb: &Path, residue: isize) -> VariantQueryBuilder {
        VariantQueryBuilder::new()
            .pdb_path(pdb)
            .chain('A')
            .residue(ResidueNumber::new(residue))
            .wildtype(AminoAcid::Lysine)
            .variant(AminoAcid::Alanine)
    }

    #[test]
    fn builds_atom_graph_around_variant() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let q = VariantAtomicQuery::new(query(&pdb, 2).target("ddg", 1.25).build().unwrap());
        assert_eq!(q.query_id(), "complex:A:2:LYS->ALA");

        let graph = q.build_graph().unwrap();
        assert_eq!(graph.kind(), Some(NodeKind::Atom));
        // every atom except the isolated A3 residue
        assert_eq!(graph.node_count(), 8);
        assert!(graph.nodes().all(|n| n.entity().residue() != ResidueNumber::new(3)));
        assert_eq!(graph.targets()["ddg"], 1.25);

        let flagged: Vec<String> = graph
            .nodes()
            .filter(|n| n.features[VARIANT] == FeatureValue::Scalar(1.0))
            .map(|n| n.entity().to_string())
            .collect();
        assert_eq!(flagged, vec!["A:2:CA", "A:2:N"]);

        let internal = graph
            .edges()
            .filter(|e| e.features[EDGE_TYPE] == FeatureValue::Scalar(1.0))
            .count();
        assert_eq!(internal, 4);
        assert!(graph.infer_schema().is_ok());
    }

    #[test]
    fn conservation_features_follow_the_variant() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let pssm = write_pssm(dir.path(), "A.pssm", &[("1", 'A', 0.4), ("2", 'K', 0.7)]);
        let q = VariantAtomicQuery::new(query(&pdb, 2).pssm_path('A', pssm).build().unwrap());

        let graph = q.build_graph().unwrap();
        for node in graph.nodes() {
            let on_variant = node.entity().chain() == 'A'
                && node.entity().residue() == ResidueNumber::new(2);
            let cons = &node.features[CONSERVATION];
            let diff = &node.features[CONSERVATION_DIFFERENCE];
            if on_variant {
                assert_eq!(*cons, FeatureValue::Scalar(0.7));
                let FeatureValue::Scalar(d) = diff else {
                    panic!("scalar expected");
                };
                assert!((d - (0.05 - 0.7)).abs() < 1e-12);
            } else {
                assert_eq!(*cons, FeatureValue::Scalar(0.0));
                assert_eq!(*diff, FeatureValue::Scalar(0.0));
            }
        }
    }

    #[test]
    fn missing_targets_are_not_found_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());

        let missing_residue = VariantAtomicQuery::new(query(&pdb, 99).build().unwrap());
        assert!(matches!(
            missing_residue.build_graph(),
            Err(EngineError::ResidueNotFound { .. })
        ));

        let missing_chain = VariantAtomicQuery::new(query(&pdb, 2).chain('Q').build().unwrap());
        assert!(matches!(
            missing_chain.build_graph(),
            Err(EngineError::ChainNotFound { chain: 'Q', .. })
        ));
    }

    #[test]
    fn radius_selection_includes_nearby_residues_only() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let system = load_structure(&pdb, &Default::default()).unwrap();
        let chain_a = system.find_chain_by_id('A').unwrap();
        let center = system.find_residue(chain_a, ResidueNumber::new(2)).unwrap();

        assert_eq!(surrounding_residues(&system, center, 10.0).len(), 4);
        assert_eq!(surrounding_residues(&system, center, 2.5).len(), 2);
    }
}
