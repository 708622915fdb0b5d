use super::contact::Contact;
use super::entity::{Entity, NodeKind};
use super::feature::{FeatureSchema, FeatureShape, FeatureValue, SchemaError};
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Graph holds {expected} nodes, cannot add {found} node '{entity}'")]
    MixedGranularity {
        expected: NodeKind,
        found: NodeKind,
        entity: String,
    },
    #[error("Node '{0}' is not part of the graph")]
    UnknownNode(String),
    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaError),
}

pub type FeatureMap = BTreeMap<String, FeatureValue>;

#[derive(Debug, Clone)]
pub struct Node {
    entity: Entity,
    pub features: FeatureMap,
}

impl Node {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn position(&self) -> Point3<f64> {
        self.entity.position()
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    contact: Contact,
    pub features: FeatureMap,
}

impl Edge {
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn position1(&self) -> Point3<f64> {
        self.contact.first().position()
    }

    pub fn position2(&self) -> Point3<f64> {
        self.contact.second().position()
    }
}

/// Nodes keyed by entity and edges keyed by unordered entity pair.
///
/// Iteration over nodes and edges follows the entity ordering, which is the
/// stable node order used by the exporter.
#[derive(Debug, Clone)]
pub struct Graph {
    id: String,
    kind: Option<NodeKind>,
    nodes: BTreeMap<Entity, Node>,
    edges: BTreeMap<Contact, Edge>,
    targets: BTreeMap<String, f64>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            targets: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Node granularity, `None` while the graph is empty.
    pub fn kind(&self) -> Option<NodeKind> {
        self.kind
    }

    fn check_kind(expected: NodeKind, entity: &Entity) -> Result<(), GraphError> {
        if expected != entity.kind() {
            return Err(GraphError::MixedGranularity {
                expected,
                found: entity.kind(),
                entity: entity.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the node for `entity`, creating a featureless one if needed.
    pub fn add_node(&mut self, entity: Entity) -> Result<&mut Node, GraphError> {
        let expected = *self.kind.get_or_insert(entity.kind());
        Self::check_kind(expected, &entity)?;
        Ok(self.nodes.entry(entity.clone()).or_insert_with(|| Node {
            entity,
            features: FeatureMap::new(),
        }))
    }

    /// Inserts an edge, creating missing endpoint nodes. An existing edge for
    /// the same pair is replaced.
    pub fn add_edge(&mut self, contact: Contact) -> Result<&mut Edge, GraphError> {
        let expected = self.kind.unwrap_or(contact.first().kind());
        Self::check_kind(expected, contact.first())?;
        Self::check_kind(expected, contact.second())?;
        self.add_node(contact.first().clone())?;
        self.add_node(contact.second().clone())?;
        let edge = Edge {
            contact: contact.clone(),
            features: FeatureMap::new(),
        };
        self.edges.insert(contact.clone(), edge);
        self.edges
            .get_mut(&contact)
            .ok_or_else(|| GraphError::UnknownNode(contact.to_string()))
    }

    pub fn node(&self, entity: &Entity) -> Option<&Node> {
        self.nodes.get(entity)
    }

    pub fn node_mut(&mut self, entity: &Entity) -> Option<&mut Node> {
        self.nodes.get_mut(entity)
    }

    pub fn edge(&self, contact: &Contact) -> Option<&Edge> {
        self.edges.get(contact)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.values_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_target(&mut self, name: impl Into<String>, value: f64) {
        self.targets.insert(name.into(), value);
    }

    pub fn targets(&self) -> &BTreeMap<String, f64> {
        &self.targets
    }

    /// Mean of all node positions, `None` for an empty graph.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        let positions: Vec<Point3<f64>> = self.nodes().map(Node::position).collect();
        crate::core::utils::geometry::centroid(&positions)
    }

    /// Endpoint node indices of every edge, in edge iteration order.
    pub fn edge_index(&self) -> Vec<[usize; 2]> {
        let positions: HashMap<&Entity, usize> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(i, entity)| (entity, i))
            .collect();
        self.edges
            .keys()
            .filter_map(|contact| {
                Some([
                    *positions.get(contact.first())?,
                    *positions.get(contact.second())?,
                ])
            })
            .collect()
    }

    /// Derives the schema from the features present and checks that every
    /// node (and every edge) carries the same names with the same shapes.
    pub fn infer_schema(&self) -> Result<FeatureSchema, SchemaError> {
        let mut schema = FeatureSchema::new();
        let node_shapes = uniform_shapes(
            self.nodes().map(|n| (n.entity.to_string(), &n.features)),
        )?;
        for (name, shape) in node_shapes {
            schema.declare_node(&name, shape)?;
        }
        let edge_shapes = uniform_shapes(
            self.edges().map(|e| (e.contact.to_string(), &e.features)),
        )?;
        for (name, shape) in edge_shapes {
            schema.declare_edge(&name, shape)?;
        }
        Ok(schema)
    }

    /// Checks every node and edge against a declared schema: each carries
    /// exactly the declared names with the declared shapes.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), SchemaError> {
        for node in self.nodes() {
            check_exact(
                &node.entity.to_string(),
                &node.features,
                schema.node_features(),
                |name, value| schema.check_node(name, value),
            )?;
        }
        for edge in self.edges() {
            check_exact(
                &edge.contact.to_string(),
                &edge.features,
                schema.edge_features(),
                |name, value| schema.check_edge(name, value),
            )?;
        }
        Ok(())
    }
}

fn uniform_shapes<'a>(
    mut owners: impl Iterator<Item = (String, &'a FeatureMap)>,
) -> Result<BTreeMap<String, FeatureShape>, SchemaError> {
    let Some((_, first)) = owners.next() else {
        return Ok(BTreeMap::new());
    };
    let reference: BTreeMap<String, FeatureShape> = first
        .iter()
        .map(|(name, value)| (name.clone(), value.shape()))
        .collect();
    for (owner, features) in owners {
        if let Some(extra) = features.keys().find(|name| !reference.contains_key(*name)) {
            return Err(SchemaError::Undeclared(extra.clone()));
        }
        for (name, expected) in &reference {
            let value = features.get(name).ok_or_else(|| SchemaError::MissingFeature {
                owner: owner.clone(),
                feature: name.clone(),
            })?;
            if value.shape() != *expected {
                return Err(SchemaError::ShapeMismatch {
                    feature: name.clone(),
                    expected: *expected,
                    found: value.shape(),
                });
            }
        }
    }
    Ok(reference)
}

fn check_exact(
    owner: &str,
    features: &FeatureMap,
    declared: &BTreeMap<String, FeatureShape>,
    check: impl Fn(&str, &FeatureValue) -> Result<(), SchemaError>,
) -> Result<(), SchemaError> {
    for (name, value) in features {
        check(name, value)?;
    }
    if let Some(missing) = declared.keys().find(|name| !features.contains_key(*name)) {
        return Err(SchemaError::MissingFeature {
            owner: owner.to_string(),
            feature: missing.clone(),
        });
    }
    Ok(())
}
