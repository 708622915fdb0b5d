use super::{Query, finish_graph, insert_edge, load_structure, model_id};
use crate::core::graph::entity::Entity;
use crate::core::graph::graph::Graph;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::engine::config::{InterfaceQueryConfig, PssmPaths};
use crate::engine::contacts::{interface_residue_pairs, residue_contacts};
use crate::engine::error::EngineError;
use crate::engine::features::interface_features;
use crate::engine::features::registry::{FeatureContext, FeatureRegistry};
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};

/// Residue-level graph of a protein-protein interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceResidueQuery {
    config: InterfaceQueryConfig,
}

impl InterfaceResidueQuery {
    pub fn new(config: InterfaceQueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterfaceQueryConfig {
        &self.config
    }

    fn chain(&self, system: &MolecularSystem, chain: char) -> Result<ChainId, EngineError> {
        system
            .find_chain_by_id(chain)
            .ok_or_else(|| EngineError::ChainNotFound {
                model: model_id(&self.config.pdb_path),
                chain,
            })
    }
}

/// A residue takes part in the graph when it is a standard amino acid and,
/// if its chain has a conservation table, the table covers it.
fn is_valid_residue(system: &MolecularSystem, residue_id: ResidueId) -> bool {
    let Some(residue) = system.residue(residue_id) else {
        return false;
    };
    if residue.amino_acid.is_none() {
        debug!(residue = %residue.number, name = %residue.name, "Not an amino acid, excluded");
        return false;
    }
    let covered = system
        .chain(residue.chain_id)
        .and_then(|chain| chain.pssm())
        .is_none_or(|pssm| pssm.contains(residue.number));
    if !covered {
        debug!(residue = %residue.number, "Residue missing from conservation table, excluded");
    }
    covered
}

impl Query for InterfaceResidueQuery {
    fn query_id(&self) -> String {
        format!(
            "{}:{}-{}",
            model_id(&self.config.pdb_path),
            self.config.chain1,
            self.config.chain2
        )
    }

    fn load_system(&self) -> Result<MolecularSystem, EngineError> {
        let pssm_paths: PssmPaths = self
            .config
            .pssm_paths
            .iter()
            .filter(|(chain, _)| [self.config.chain1, self.config.chain2].contains(chain))
            .map(|(chain, path)| (*chain, path.clone()))
            .collect();
        load_structure(&self.config.pdb_path, &pssm_paths)
    }

    fn default_features(&self) -> Result<FeatureRegistry, EngineError> {
        Ok(interface_features(!self.config.pssm_paths.is_empty())?)
    }

    #[instrument(skip_all, name = "interface_query", fields(query = %self.query_id()))]
    fn build_graph_from_system(
        &self,
        system: &MolecularSystem,
        features: &FeatureRegistry,
    ) -> Result<Graph, EngineError> {
        let chain1 = self.chain(system, self.config.chain1)?;
        let chain2 = self.chain(system, self.config.chain2)?;

        let pairs = interface_residue_pairs(system, chain1, chain2, self.config.interface_cutoff);
        if pairs.is_empty() {
            return Err(EngineError::EmptyInterface {
                model: model_id(&self.config.pdb_path),
                chain1: self.config.chain1,
                chain2: self.config.chain2,
            });
        }

        let mut validity: HashMap<ResidueId, bool> = HashMap::new();
        let mut valid = |id: ResidueId| {
            *validity
                .entry(id)
                .or_insert_with(|| is_valid_residue(system, id))
        };
        let interface_pairs: Vec<_> = pairs
            .iter()
            .filter(|pair| valid(pair.first) & valid(pair.second))
            .collect();
        let excluded = pairs
            .iter()
            .flat_map(|pair| [pair.first, pair.second])
            .unique()
            .filter(|id| !valid(*id))
            .count();
        if excluded > 0 {
            warn!(excluded, "Interface residues excluded for missing annotations");
        }

        let entity = |id: ResidueId| {
            Entity::from_residue(system, id)
                .ok_or_else(|| EngineError::EmptyResult(self.query_id()))
        };
        let mut graph = Graph::new(self.query_id());
        for pair in &interface_pairs {
            insert_edge(
                &mut graph,
                entity(pair.first)?,
                entity(pair.second)?,
                pair.distance,
                pair.edge_type,
            )?;
        }

        for side in [chain1, chain2] {
            let residues: Vec<ResidueId> = interface_pairs
                .iter()
                .flat_map(|pair| [pair.first, pair.second])
                .filter(|id| system.residue(*id).is_some_and(|r| r.chain_id == side))
                .unique()
                .collect();
            for contact in residue_contacts(system, &residues, self.config.internal_cutoff) {
                insert_edge(
                    &mut graph,
                    entity(contact.first)?,
                    entity(contact.second)?,
                    contact.distance,
                    contact.edge_type,
                )?;
            }
        }

        let chain_codes = BTreeMap::from([(self.config.chain1, 0.0), (self.config.chain2, 1.0)]);
        let context = FeatureContext {
            system,
            variant: None,
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
    use crate::engine::config::InterfaceQueryBuilder;
    use crate::engine::features::{CHAIN, CONSERVATION, EDGE_DISTANCE, EDGE_TYPE, PSSM};
    use crate::engine::query::test_support::{write_complex, write_pssm};

    fn edge_summary(graph: &Graph) -> Vec<(String, f64)> {
        graph
            .edges()
            .map(|e| {
                let FeatureValue::Scalar(kind) = e.features[EDGE_TYPE] else {
                    panic!("scalar expected");
                };
                (e.contact().to_string(), kind)
            })
            .collect()
    }

    #[test]
    fn builds_residue_graph_with_interface_and_internal_edges() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let q = InterfaceResidueQuery::new(
            InterfaceQueryBuilder::new()
                .pdb_path(&pdb)
                .chains('A', 'B')
                .build()
                .unwrap(),
        );
        assert_eq!(q.query_id(), "complex:A-B");

        let graph = q.build_graph().unwrap();
        assert_eq!(graph.kind(), Some(NodeKind::Residue));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(
            edge_summary(&graph),
            vec![
                ("A:1-A:2".to_string(), 1.0),
                ("A:1-B:1".to_string(), 0.0),
                ("A:2-B:1".to_string(), 0.0),
                ("A:2-B:2".to_string(), 0.0),
                ("B:1-B:2".to_string(), 1.0),
            ]
        );

        // residue distance is the closest atom pair, not the centroid distance
        let a1_a2 = graph.edges().next().unwrap();
        let FeatureValue::Scalar(dist) = a1_a2.features[EDGE_DISTANCE] else {
            panic!("scalar expected");
        };
        assert!((dist - 2.1).abs() < 1e-9);

        let chains: Vec<_> = graph.nodes().map(|n| n.features[CHAIN].clone()).collect();
        assert_eq!(
            chains,
            vec![
                FeatureValue::Scalar(0.0),
                FeatureValue::Scalar(0.0),
                FeatureValue::Scalar(1.0),
                FeatureValue::Scalar(1.0)
            ]
        );
        assert!(graph.nodes().all(|n| !n.features.contains_key(PSSM)));
    }

    #[test]
    fn residues_missing_from_conservation_tables_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let pssm_a = write_pssm(dir.path(), "A.pssm", &[("1", 'A', 0.3), ("2", 'K', 0.6)]);
        let pssm_b = write_pssm(dir.path(), "B.pssm", &[("1", 'D', 0.9)]);
        let q = InterfaceResidueQuery::new(
            InterfaceQueryBuilder::new()
                .pdb_path(&pdb)
                .chains('A', 'B')
                .pssm_path('A', pssm_a)
                .pssm_path('B', pssm_b)
                .build()
                .unwrap(),
        );

        let graph = q.build_graph().unwrap();
        let ids: Vec<String> = graph.nodes().map(|n| n.entity().to_string()).collect();
        assert_eq!(ids, vec!["A:1", "A:2", "B:1"]);
        assert_eq!(graph.edge_count(), 3);

        let b1 = graph.nodes().last().unwrap();
        assert_eq!(b1.features[CONSERVATION], FeatureValue::Scalar(0.9));
        assert_eq!(b1.features[PSSM].components().len(), 20);
        graph.infer_schema().unwrap();
    }

    #[test]
    fn no_contacts_within_cutoff_is_an_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = write_complex(dir.path());
        let q = InterfaceResidueQuery::new(
            InterfaceQueryBuilder::new()
                .pdb_path(&pdb)
                .chains('A', 'B')
                .interface_cutoff(1.0)
                .build()
                .unwrap(),
        );
        assert!(matches!(
            q.build_graph(),
            Err(EngineError::EmptyInterface { .. })
        ));

        let missing = InterfaceResidueQuery::new(
            InterfaceQueryBuilder::new()
                .pdb_path(&pdb)
                .chains('A', 'Z')
                .build()
                .unwrap(),
        );
        assert!(matches!(
            missing.build_graph(),
            Err(EngineError::ChainNotFound { chain: 'Z', .. })
        ));
    }
}
