use super::ids::ResidueId;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Chemical element of an atom, reduced to the classes used for featurization.
///
/// Everything that is not one of the common biomolecular elements collapses
/// into [`Element::Other`]; the graph features only distinguish these classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Element {
    Carbon,
    Nitrogen,
    Oxygen,
    Sulfur,
    Hydrogen,
    #[default]
    Other,
}

impl Element {
    /// Heavy-atom element classes in one-hot order.
    pub const ONE_HOT_ORDER: [Element; 5] = [
        Element::Carbon,
        Element::Nitrogen,
        Element::Oxygen,
        Element::Sulfur,
        Element::Other,
    ];

    /// Infers the element from a PDB atom name when the element column is blank.
    ///
    /// PDB atom names start with the element symbol for the common protein
    /// elements, optionally preceded by a digit (`1HB`, `2HG1`).
    pub fn from_atom_name(atom_name: &str) -> Self {
        let first_letter = atom_name
            .trim()
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase());
        match first_letter {
            Some('C') => Element::Carbon,
            Some('N') => Element::Nitrogen,
            Some('O') => Element::Oxygen,
            Some('S') => Element::Sulfur,
            Some('H') | Some('D') => Element::Hydrogen,
            _ => Element::Other,
        }
    }

    pub fn one_hot(&self) -> [f64; 5] {
        let mut encoding = [0.0; 5];
        let index = Self::ONE_HOT_ORDER
            .iter()
            .position(|e| e == self)
            .unwrap_or(Self::ONE_HOT_ORDER.len() - 1);
        encoding[index] = 1.0;
        encoding
    }
}

impl FromStr for Element {
    type Err = ();

    /// Parses an element symbol as found in columns 77-78 of a PDB record.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Element::Carbon),
            "N" => Ok(Element::Nitrogen),
            "O" => Ok(Element::Oxygen),
            "S" => Ok(Element::Sulfur),
            "H" | "D" => Ok(Element::Hydrogen),
            "" => Err(()),
            _ => Ok(Element::Other),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Element::Carbon => "C",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Sulfur => "S",
            Element::Hydrogen => "H",
            Element::Other => "X",
        };
        f.write_str(symbol)
    }
}

/// An atom of a parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "SG").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The element class of the atom.
    pub element: Element,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`, inferring the element from its name.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            element: Element::from_atom_name(name),
            position,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_infers_element_from_name() {
        let residue_id = ResidueId::default();
        assert_eq!(Atom::new("CA", residue_id, Point3::origin()).element, Element::Carbon);
        assert_eq!(Atom::new("SG", residue_id, Point3::origin()).element, Element::Sulfur);
        assert_eq!(Atom::new("1HB", residue_id, Point3::origin()).element, Element::Hydrogen);
        assert_eq!(Atom::new("OXT", residue_id, Point3::origin()).element, Element::Oxygen);
    }

    #[test]
    fn explicit_element_overrides_inferred_one() {
        let atom = Atom::new("CA", ResidueId::default(), Point3::origin()).with_element(Element::Other);
        assert_eq!(atom.element, Element::Other);
    }

    #[test]
    fn from_str_parses_element_column() {
        assert_eq!(Element::from_str(" N"), Ok(Element::Nitrogen));
        assert_eq!(Element::from_str("fe"), Ok(Element::Other));
        assert_eq!(Element::from_str("  "), Err(()));
    }

    #[test]
    fn one_hot_maps_hydrogen_to_other_class() {
        assert_eq!(Element::Carbon.one_hot(), [1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(Element::Sulfur.one_hot(), [0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(Element::Hydrogen.one_hot(), [0.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
