use super::entity::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a contact.
///
/// `Internal` covers covalent and short-range contacts within one molecule,
/// `Interface` everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    Internal,
    Interface,
}

impl EdgeType {
    /// Numeric encoding stored as the `type` edge feature.
    pub fn encode(&self) -> f64 {
        match self {
            EdgeType::Internal => 1.0,
            EdgeType::Interface => 0.0,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeType::Internal => write!(f, "internal"),
            EdgeType::Interface => write!(f, "interface"),
        }
    }
}

/// An unordered pair of distinct entities.
///
/// The pair is stored in canonical order, so `Contact::new(a, b)` and
/// `Contact::new(b, a)` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Contact {
    first: Entity,
    second: Entity,
}

impl Contact {
    /// Returns `None` for a self pair.
    pub fn new(a: Entity, b: Entity) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &Entity {
        &self.first
    }

    pub fn second(&self) -> &Entity {
        &self.second
    }

    pub fn distance(&self) -> f64 {
        nalgebra::distance(&self.first.position(), &self.second.position())
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::entity::test_support::residue_entity;

    #[test]
    fn contact_is_unordered() {
        let a = residue_entity('A', 1, [0.0, 0.0, 0.0]);
        let b = residue_entity('A', 2, [3.0, 4.0, 0.0]);
        let ab = Contact::new(a.clone(), b.clone()).unwrap();
        let ba = Contact::new(b.clone(), a.clone()).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.first(), &a);
        assert_eq!(ab.second(), &b);
        assert!((ab.distance() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn self_pairs_are_rejected() {
        let a = residue_entity('A', 1, [0.0; 3]);
        let moved = residue_entity('A', 1, [1.0; 3]);
        assert!(Contact::new(a, moved).is_none());
    }

    #[test]
    fn edge_type_encoding() {
        assert_eq!(EdgeType::Internal.encode(), 1.0);
        assert_eq!(EdgeType::Interface.encode(), 0.0);
        assert_eq!(EdgeType::Interface.to_string(), "interface");
    }
}
