use super::registry::{FeatureContext, FeatureRegistry};
use super::{CHAIN, CHARGE, POLARITY, POSITION, RESIDUE_TYPE, VARIANT};
use crate::core::graph::entity::Entity;
use crate::core::graph::feature::{FeatureShape, FeatureValue, SchemaError};
use crate::core::models::amino_acid::{AminoAcid, Polarity};

fn amino_acid(context: &FeatureContext<'_>, entity: &Entity) -> Option<AminoAcid> {
    context
        .residue_of(entity)
        .and_then(|(_, residue)| residue.amino_acid)
}

/// Geometry and amino-acid identity features, shared by atom and residue graphs.
///
/// Nodes on residues without a standard amino acid get zero vectors.
pub fn register(registry: &mut FeatureRegistry) -> Result<(), SchemaError> {
    registry.register_node(POSITION, FeatureShape::Vector(3), |_, entity| {
        let p = entity.position();
        [p.x, p.y, p.z].into()
    })?;
    registry.register_node(CHAIN, FeatureShape::Scalar, |context, entity| {
        FeatureValue::Scalar(
            context
                .chain_codes
                .get(&entity.chain())
                .copied()
                .unwrap_or(0.0),
        )
    })?;
    registry.register_node(
        RESIDUE_TYPE,
        FeatureShape::Vector(AminoAcid::COUNT),
        |context, entity| {
            amino_acid(context, entity)
                .map(|aa| aa.one_hot())
                .unwrap_or([0.0; AminoAcid::COUNT])
                .into()
        },
    )?;
    registry.register_node(CHARGE, FeatureShape::Scalar, |context, entity| {
        FeatureValue::Scalar(amino_acid(context, entity).map_or(0.0, |aa| aa.charge()))
    })?;
    registry.register_node(
        POLARITY,
        FeatureShape::Vector(Polarity::COUNT),
        |context, entity| {
            amino_acid(context, entity)
                .map(|aa| aa.polarity().one_hot())
                .unwrap_or([0.0; Polarity::COUNT])
                .into()
        },
    )?;
    Ok(())
}

/// Flags the variant residue (or its atoms) with 1, everything else with 0.
pub fn register_variant_flag(registry: &mut FeatureRegistry) -> Result<(), SchemaError> {
    registry.register_node(VARIANT, FeatureShape::Scalar, |context, entity| {
        context.is_variant_residue(entity).into()
    })
}
