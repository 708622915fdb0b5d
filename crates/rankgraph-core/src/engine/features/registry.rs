use crate::core::graph::contact::Contact;
use crate::core::graph::entity::Entity;
use crate::core::graph::feature::{FeatureSchema, FeatureShape, FeatureValue, SchemaError};
use crate::core::graph::graph::Graph;
use crate::core::models::amino_acid::AminoAcid;
use crate::core::models::ids::ResidueId;
use crate::core::models::pssm::PssmRow;
use crate::core::models::residue::Residue;
use crate::core::models::system::MolecularSystem;
use std::collections::BTreeMap;
use tracing::trace;

/// The substituted residue of a variant query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSite {
    pub residue: ResidueId,
    pub wildtype: AminoAcid,
    pub variant: AminoAcid,
}

/// Read-only state handed to every feature callback.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext<'a> {
    pub system: &'a MolecularSystem,
    pub variant: Option<VariantSite>,
    /// Numeric code per chain letter for the `chain` feature.
    pub chain_codes: &'a BTreeMap<char, f64>,
}

impl<'a> FeatureContext<'a> {
    pub fn residue_of(&self, entity: &Entity) -> Option<(ResidueId, &'a Residue)> {
        let id = entity.residue_id(self.system)?;
        self.system.residue(id).map(|residue| (id, residue))
    }

    /// The conservation row of the entity's residue, if its chain has a profile covering it.
    pub fn pssm_row(&self, entity: &Entity) -> Option<&'a PssmRow> {
        let (_, residue) = self.residue_of(entity)?;
        self.system
            .chain(residue.chain_id)?
            .pssm()?
            .get(residue.number)
    }

    pub fn is_variant_residue(&self, entity: &Entity) -> bool {
        match (self.variant, self.residue_of(entity)) {
            (Some(site), Some((id, _))) => site.residue == id,
            _ => false,
        }
    }
}

pub type NodeFeatureFn = Box<dyn Fn(&FeatureContext<'_>, &Entity) -> FeatureValue + Send + Sync>;
pub type EdgeFeatureFn = Box<dyn Fn(&FeatureContext<'_>, &Contact) -> FeatureValue + Send + Sync>;

struct Registered<F> {
    name: String,
    shape: FeatureShape,
    compute: F,
}

/// Named feature callbacks with declared shapes.
///
/// The registry is the source of a query's [`FeatureSchema`]: every callback
/// runs once per node (or edge) and its result is checked against the shape
/// it was registered with.
#[derive(Default)]
pub struct FeatureRegistry {
    node: Vec<Registered<NodeFeatureFn>>,
    edge: Vec<Registered<EdgeFeatureFn>>,
}

fn upsert<F>(
    list: &mut Vec<Registered<F>>,
    name: &str,
    shape: FeatureShape,
    compute: F,
) -> Result<(), SchemaError> {
    match list.iter_mut().find(|r| r.name == name) {
        Some(existing) if existing.shape != shape => Err(SchemaError::ConflictingDeclaration {
            feature: name.to_string(),
            first: existing.shape,
            second: shape,
        }),
        Some(existing) => {
            existing.compute = compute;
            Ok(())
        }
        None => {
            list.push(Registered {
                name: name.to_string(),
                shape,
                compute,
            });
            Ok(())
        }
    }
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node feature. Re-registering a name with the same shape replaces the callback.
    pub fn register_node<F>(&mut self, name: &str, shape: FeatureShape, f: F) -> Result<(), SchemaError>
    where
        F: Fn(&FeatureContext<'_>, &Entity) -> FeatureValue + Send + Sync + 'static,
    {
        upsert(&mut self.node, name, shape, Box::new(f))
    }

    pub fn register_edge<F>(&mut self, name: &str, shape: FeatureShape, f: F) -> Result<(), SchemaError>
    where
        F: Fn(&FeatureContext<'_>, &Contact) -> FeatureValue + Send + Sync + 'static,
    {
        upsert(&mut self.edge, name, shape, Box::new(f))
    }

    pub fn node_feature_names(&self) -> impl Iterator<Item = &str> {
        self.node.iter().map(|r| r.name.as_str())
    }

    /// Adds every registered feature to `schema`.
    pub fn declare(&self, schema: &mut FeatureSchema) -> Result<(), SchemaError> {
        for feature in &self.node {
            schema.declare_node(&feature.name, feature.shape)?;
        }
        for feature in &self.edge {
            schema.declare_edge(&feature.name, feature.shape)?;
        }
        Ok(())
    }

    /// Runs every callback on every node and edge of `graph`.
    pub fn apply(
        &self,
        context: &FeatureContext<'_>,
        schema: &FeatureSchema,
        graph: &mut Graph,
    ) -> Result<(), SchemaError> {
        for node in graph.nodes_mut() {
            for feature in &self.node {
                let value = (feature.compute)(context, node.entity());
                schema.check_node(&feature.name, &value)?;
                node.features.insert(feature.name.clone(), value);
            }
        }
        for edge in graph.edges_mut() {
            for feature in &self.edge {
                let value = (feature.compute)(context, edge.contact());
                schema.check_edge(&feature.name, &value)?;
                edge.features.insert(feature.name.clone(), value);
            }
        }
        trace!(
            graph = graph.id(),
            node_features = self.node.len(),
            edge_features = self.edge.len(),
            "Applied feature callbacks"
        );
        Ok(())
    }
}
