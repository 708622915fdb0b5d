use super::ELEMENT;
use super::registry::FeatureRegistry;
use crate::core::graph::entity::EntityHandle;
use crate::core::graph::feature::{FeatureShape, SchemaError};
use crate::core::models::atom::Element;

/// One-hot element type (C, N, O, S, other); residue nodes get all zeros.
pub fn register(registry: &mut FeatureRegistry) -> Result<(), SchemaError> {
    registry.register_node(
        ELEMENT,
        FeatureShape::Vector(Element::ONE_HOT_ORDER.len()),
        |context, entity| {
            let encoding = match entity.handle() {
                EntityHandle::Atom(id) => context
                    .system
                    .atom(id)
                    .map(|atom| atom.element.one_hot())
                    .unwrap_or_default(),
                EntityHandle::Residue(_) => [0.0; 5],
            };
            encoding.into()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::entity::Entity;
    use crate::core::graph::feature::{FeatureSchema, FeatureValue};
    use crate::core::graph::graph::Graph;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::models::residue::ResidueNumber;
    use crate::core::models::system::MolecularSystem;
    use crate::engine::features::registry::FeatureContext;
    use nalgebra::Point3;
    use std::collections::BTreeMap;

    #[test]
    fn element_is_one_hot_encoded() {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let cys = system
            .add_residue(chain, ResidueNumber::new(1), "CYS")
            .unwrap();
        let sg = system
            .add_atom_to_residue(cys, Atom::new("SG", cys, Point3::origin()))
            .unwrap();

        let mut registry = FeatureRegistry::new();
        register(&mut registry).unwrap();
        let mut schema = FeatureSchema::new();
        registry.declare(&mut schema).unwrap();

        let mut graph = Graph::new("g");
        graph
            .add_node(Entity::from_atom(&system, sg).unwrap())
            .unwrap();
        let codes = BTreeMap::new();
        let context = FeatureContext {
            system: &system,
            variant: None,
            chain_codes: &codes,
        };
        registry.apply(&context, &schema, &mut graph).unwrap();

        let node = graph.nodes().next().unwrap();
        assert_eq!(
            node.features[ELEMENT],
            FeatureValue::Vector(vec![0.0, 0.0, 0.0, 1.0, 0.0])
        );
    }
}
