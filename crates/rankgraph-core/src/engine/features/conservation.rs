use super::registry::{FeatureContext, FeatureRegistry};
use super::{CONSERVATION, CONSERVATION_DIFFERENCE, INFORMATION_CONTENT, PSSM};
use crate::core::graph::entity::Entity;
use crate::core::graph::feature::{FeatureShape, FeatureValue, SchemaError};
use crate::core::models::amino_acid::AminoAcid;

/// Conservation of the node's own amino acid, or of the wildtype on the
/// variant residue when the query is a variant (0 on every other residue).
fn conservation(context: &FeatureContext<'_>, entity: &Entity) -> f64 {
    let Some(row) = context.pssm_row(entity) else {
        return 0.0;
    };
    match context.variant {
        Some(site) if context.is_variant_residue(entity) => row.conservation(site.wildtype),
        Some(_) => 0.0,
        None => context
            .residue_of(entity)
            .and_then(|(_, residue)| residue.amino_acid)
            .map_or(0.0, |aa| row.conservation(aa)),
    }
}

/// Profile features read from the chain's conservation table.
///
/// Residues missing from the table get zeros; residue-level queries drop
/// such residues before features are computed.
pub fn register(registry: &mut FeatureRegistry) -> Result<(), SchemaError> {
    registry.register_node(
        PSSM,
        FeatureShape::Vector(AminoAcid::COUNT),
        |context, entity| {
            context
                .pssm_row(entity)
                .map(|row| row.conservations)
                .unwrap_or([0.0; AminoAcid::COUNT])
                .into()
        },
    )?;
    registry.register_node(INFORMATION_CONTENT, FeatureShape::Scalar, |context, entity| {
        FeatureValue::Scalar(
            context
                .pssm_row(entity)
                .map_or(0.0, |row| row.information_content),
        )
    })?;
    registry.register_node(CONSERVATION, FeatureShape::Scalar, |context, entity| {
        FeatureValue::Scalar(conservation(context, entity))
    })
}

/// Conservation change from wildtype to variant, on the variant residue only.
pub fn register_variant_difference(registry: &mut FeatureRegistry) -> Result<(), SchemaError> {
    registry.register_node(
        CONSERVATION_DIFFERENCE,
        FeatureShape::Scalar,
        |context, entity| {
            let difference = match (context.variant, context.pssm_row(entity)) {
                (Some(site), Some(row)) if context.is_variant_residue(entity) => {
                    row.conservation(site.variant) - row.conservation(site.wildtype)
                }
                _ => 0.0,
            };
            FeatureValue::Scalar(difference)
        },
    )
}
