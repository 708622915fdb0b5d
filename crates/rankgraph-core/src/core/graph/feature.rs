use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Numeric value of a node or edge feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// Declared shape of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureShape {
    Scalar,
    Vector(usize),
}

impl FeatureShape {
    /// Number of components; mapped grid fields are produced per component.
    pub fn len(&self) -> usize {
        match self {
            FeatureShape::Scalar => 1,
            FeatureShape::Vector(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureShape::Scalar => write!(f, "scalar"),
            FeatureShape::Vector(n) => write!(f, "vector[{n}]"),
        }
    }
}

impl FeatureValue {
    pub fn shape(&self) -> FeatureShape {
        match self {
            FeatureValue::Scalar(_) => FeatureShape::Scalar,
            FeatureValue::Vector(v) => FeatureShape::Vector(v.len()),
        }
    }

    pub fn components(&self) -> &[f64] {
        match self {
            FeatureValue::Scalar(value) => std::slice::from_ref(value),
            FeatureValue::Vector(values) => values,
        }
    }

    /// The zero value of a shape, used to fill features that do not apply to a node.
    pub fn zeros(shape: FeatureShape) -> Self {
        match shape {
            FeatureShape::Scalar => FeatureValue::Scalar(0.0),
            FeatureShape::Vector(n) => FeatureValue::Vector(vec![0.0; n]),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Scalar(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Scalar(if value { 1.0 } else { 0.0 })
    }
}

impl From<Vec<f64>> for FeatureValue {
    fn from(values: Vec<f64>) -> Self {
        FeatureValue::Vector(values)
    }
}

impl<const N: usize> From<[f64; N]> for FeatureValue {
    fn from(values: [f64; N]) -> Self {
        FeatureValue::Vector(values.to_vec())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Feature '{0}' is not declared in the schema")]
    Undeclared(String),
    #[error("Feature '{feature}' has shape {found}, expected {expected}")]
    ShapeMismatch {
        feature: String,
        expected: FeatureShape,
        found: FeatureShape,
    },
    #[error("{owner} is missing feature '{feature}'")]
    MissingFeature { owner: String, feature: String },
    #[error("Feature '{feature}' is declared as both {first} and {second}")]
    ConflictingDeclaration {
        feature: String,
        first: FeatureShape,
        second: FeatureShape,
    },
}

/// The feature names and shapes every node (and every edge) of one graph carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSchema {
    node: BTreeMap<String, FeatureShape>,
    edge: BTreeMap<String, FeatureShape>,
}

fn declare_in(
    map: &mut BTreeMap<String, FeatureShape>,
    name: &str,
    shape: FeatureShape,
) -> Result<(), SchemaError> {
    match map.get(name) {
        Some(existing) if *existing != shape => Err(SchemaError::ConflictingDeclaration {
            feature: name.to_string(),
            first: *existing,
            second: shape,
        }),
        Some(_) => Ok(()),
        None => {
            map.insert(name.to_string(), shape);
            Ok(())
        }
    }
}

fn check_in(
    map: &BTreeMap<String, FeatureShape>,
    name: &str,
    value: &FeatureValue,
) -> Result<(), SchemaError> {
    let expected = map
        .get(name)
        .ok_or_else(|| SchemaError::Undeclared(name.to_string()))?;
    let found = value.shape();
    if *expected != found {
        return Err(SchemaError::ShapeMismatch {
            feature: name.to_string(),
            expected: *expected,
            found,
        });
    }
    Ok(())
}

impl FeatureSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a node feature. Re-declaring with the same shape is a no-op.
    pub fn declare_node(&mut self, name: &str, shape: FeatureShape) -> Result<(), SchemaError> {
        declare_in(&mut self.node, name, shape)
    }

    /// Declares an edge feature. Re-declaring with the same shape is a no-op.
    pub fn declare_edge(&mut self, name: &str, shape: FeatureShape) -> Result<(), SchemaError> {
        declare_in(&mut self.edge, name, shape)
    }

    pub fn check_node(&self, name: &str, value: &FeatureValue) -> Result<(), SchemaError> {
        check_in(&self.node, name, value)
    }

    pub fn check_edge(&self, name: &str, value: &FeatureValue) -> Result<(), SchemaError> {
        check_in(&self.edge, name, value)
    }

    pub fn node_features(&self) -> &BTreeMap<String, FeatureShape> {
        &self.node
    }

    pub fn edge_features(&self) -> &BTreeMap<String, FeatureShape> {
        &self.edge
    }
}
