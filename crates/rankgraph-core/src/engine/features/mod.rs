//! Node and edge feature callbacks.
//!
//! Features are computed by named callbacks collected in a
//! [`FeatureRegistry`](registry::FeatureRegistry). The built-in sets cover
//! geometry, amino-acid identity, element type and conservation profiles;
//! additional callbacks can be registered per query.

pub mod atom;
pub mod conservation;
pub mod registry;
pub mod residue;

use crate::core::graph::feature::SchemaError;
use registry::FeatureRegistry;

pub const POSITION: &str = "position";
pub const CHAIN: &str = "chain";
pub const RESIDUE_TYPE: &str = "res_type";
pub const CHARGE: &str = "charge";
pub const POLARITY: &str = "polarity";
pub const ELEMENT: &str = "element";
pub const VARIANT: &str = "variant";
pub const PSSM: &str = "pssm";
pub const CONSERVATION: &str = "cons";
pub const CONSERVATION_DIFFERENCE: &str = "cons_diff";
pub const INFORMATION_CONTENT: &str = "ic";

pub const EDGE_DISTANCE: &str = "dist";
pub const EDGE_TYPE: &str = "type";

/// Built-in features of an interface (residue) graph.
pub fn interface_features(with_conservation: bool) -> Result<FeatureRegistry, SchemaError> {
    let mut registry = FeatureRegistry::new();
    residue::register(&mut registry)?;
    if with_conservation {
        conservation::register(&mut registry)?;
    }
    Ok(registry)
}

/// Built-in features of a variant (atom) graph.
pub fn variant_features(with_conservation: bool) -> Result<FeatureRegistry, SchemaError> {
    let mut registry = FeatureRegistry::new();
    residue::register(&mut registry)?;
    residue::register_variant_flag(&mut registry)?;
    atom::register(&mut registry)?;
    if with_conservation {
        conservation::register(&mut registry)?;
        conservation::register_variant_difference(&mut registry)?;
    }
    Ok(registry)
}
