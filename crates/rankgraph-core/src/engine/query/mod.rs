//! Queries turn one structure into one graph.
//!
//! A query names its target (a variant residue or a pair of chains), loads
//! the structure with its conservation tables, selects the entities in scope,
//! detects contacts and runs the feature callbacks.

pub mod interface;
pub mod variant;

use super::config::PssmPaths;
use super::error::EngineError;
use super::features::registry::{FeatureContext, FeatureRegistry};
use super::features::{EDGE_DISTANCE, EDGE_TYPE};
use crate::core::graph::contact::{Contact, EdgeType};
use crate::core::graph::entity::Entity;
use crate::core::graph::feature::{FeatureSchema, FeatureShape, FeatureValue};
use crate::core::graph::graph::Graph;
use crate::core::io::pdb::PdbFile;
use crate::core::io::pssm::read_pssm_from_path;
use crate::core::io::traits::StructureFile;
use crate::core::models::system::MolecularSystem;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

pub use interface::InterfaceResidueQuery;
pub use variant::VariantAtomicQuery;

pub trait Query: Send + Sync {
    /// Unique id of the graph this query builds; also its container entry name.
    fn query_id(&self) -> String;

    /// Reads the structure and attaches the conservation tables of the query.
    fn load_system(&self) -> Result<MolecularSystem, EngineError>;

    /// The built-in feature set of this query type.
    fn default_features(&self) -> Result<FeatureRegistry, EngineError>;

    /// Builds the graph from an already loaded structure.
    fn build_graph_from_system(
        &self,
        system: &MolecularSystem,
        features: &FeatureRegistry,
    ) -> Result<Graph, EngineError>;

    fn build_graph(&self) -> Result<Graph, EngineError> {
        let system = self.load_system()?;
        let features = self.default_features()?;
        self.build_graph_from_system(&system, &features)
    }
}

/// Model identifier derived from a structure path: its file stem.
pub fn model_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

pub(crate) fn load_structure(
    pdb_path: &Path,
    pssm_paths: &PssmPaths,
) -> Result<MolecularSystem, EngineError> {
    let mut system =
        PdbFile::read_from_path(pdb_path).map_err(|source| EngineError::Structure {
            path: pdb_path.to_string_lossy().to_string(),
            source,
        })?;

    for (&chain, path) in pssm_paths {
        let table = read_pssm_from_path(path).map_err(|source| EngineError::Conservation {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let rows = table.len();
        if system.attach_pssm(chain, table) {
            debug!(chain = %chain, rows, "Attached conservation table");
        } else {
            debug!(chain = %chain, path = %path.display(), "No such chain, conservation table ignored");
        }
    }
    Ok(system)
}

/// Inserts an edge with its `dist` and `type` features.
pub(crate) fn insert_edge(
    graph: &mut Graph,
    first: Entity,
    second: Entity,
    distance: f64,
    edge_type: EdgeType,
) -> Result<(), EngineError> {
    let Some(contact) = Contact::new(first, second) else {
        trace!("Skipping contact between entities with identical identity");
        return Ok(());
    };
    let edge = graph.add_edge(contact)?;
    edge.features
        .insert(EDGE_DISTANCE.to_string(), FeatureValue::Scalar(distance));
    edge.features
        .insert(EDGE_TYPE.to_string(), FeatureValue::Scalar(edge_type.encode()));
    Ok(())
}

/// Runs the feature callbacks, checks the result against the declared schema
/// and attaches the targets.
pub(crate) fn finish_graph(
    mut graph: Graph,
    features: &FeatureRegistry,
    context: &FeatureContext<'_>,
    targets: &BTreeMap<String, f64>,
) -> Result<Graph, EngineError> {
    if graph.is_empty() {
        return Err(EngineError::EmptyResult(graph.id().to_string()));
    }

    let mut schema = FeatureSchema::new();
    schema.declare_edge(EDGE_DISTANCE, FeatureShape::Scalar)?;
    schema.declare_edge(EDGE_TYPE, FeatureShape::Scalar)?;
    features.declare(&mut schema)?;

    features.apply(context, &schema, &mut graph)?;
    graph.validate(&schema)?;

    for (name, value) in targets {
        graph.set_target(name.clone(), *value);
    }
    debug!(
        query = graph.id(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built graph"
    );
    Ok(graph)
}
