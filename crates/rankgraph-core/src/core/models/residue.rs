use super::amino_acid::AminoAcid;
use super::ids::{AtomId, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A residue sequence number together with its optional insertion code.
///
/// Orders by number first and insertion code second, so `52 < 52A < 52B < 53`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResidueNumber {
    pub number: isize,
    pub insertion_code: Option<char>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid residue number: '{0}'")]
pub struct ParseResidueNumberError(pub String);

impl ResidueNumber {
    pub fn new(number: isize) -> Self {
        Self {
            number,
            insertion_code: None,
        }
    }

    pub fn with_insertion_code(number: isize, insertion_code: char) -> Self {
        Self {
            number,
            insertion_code: Some(insertion_code),
        }
    }
}

impl From<isize> for ResidueNumber {
    fn from(number: isize) -> Self {
        Self::new(number)
    }
}

impl FromStr for ResidueNumber {
    type Err = ParseResidueNumberError;

    /// Parses `"52"` or `"52A"`. A negative sign is allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseResidueNumberError(s.to_string());
        let (digits, insertion_code) = match trimmed.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => (&trimmed[..trimmed.len() - 1], Some(c)),
            Some(_) => (trimmed, None),
            None => return Err(err()),
        };
        let number = digits.parse::<isize>().map_err(|_| err())?;
        Ok(Self {
            number,
            insertion_code,
        })
    }
}

impl fmt::Display for ResidueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.insertion_code {
            Some(code) => write!(f, "{}{}", self.number, code),
            None => write!(f, "{}", self.number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: ResidueNumber,         // Sequence number and insertion code from source file
    pub name: String,                  // Residue name as written in the file (e.g., "ALA")
    pub amino_acid: Option<AminoAcid>, // None for ligands, waters and unknown residues
    pub chain_id: ChainId,             // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,     // Atoms in file order
}

impl Residue {
    pub(crate) fn new(number: ResidueNumber, name: &str, chain_id: ChainId) -> Self {
        Self {
            number,
            name: name.to_string(),
            amino_acid: AminoAcid::from_three_letter(name),
            chain_id,
            atoms: Vec::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_id: AtomId) {
        self.atoms.push(atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn residue_number_parses_plain_and_insertion_codes() {
        assert_eq!("52".parse::<ResidueNumber>(), Ok(ResidueNumber::new(52)));
        assert_eq!("52A".parse::<ResidueNumber>(), Ok(ResidueNumber::with_insertion_code(52, 'A')));
        assert_eq!(" -3 ".parse::<ResidueNumber>(), Ok(ResidueNumber::new(-3)));
        assert!("".parse::<ResidueNumber>().is_err());
        assert!("A".parse::<ResidueNumber>().is_err());
        assert!("5x2".parse::<ResidueNumber>().is_err());
    }

    #[test]
    fn residue_number_orders_insertion_codes_after_plain_number() {
        let mut numbers = vec![
            ResidueNumber::new(53),
            ResidueNumber::with_insertion_code(52, 'B'),
            ResidueNumber::new(52),
            ResidueNumber::with_insertion_code(52, 'A'),
        ];
        numbers.sort();
        let rendered: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
        assert_eq!(rendered, vec!["52", "52A", "52B", "53"]);
    }

    #[test]
    fn new_residue_recognizes_amino_acid() {
        let residue = Residue::new(ResidueNumber::new(10), "GLY", dummy_chain_id(1));
        assert_eq!(residue.amino_acid, Some(AminoAcid::Glycine));
        assert!(residue.atoms().is_empty());

        let water = Residue::new(ResidueNumber::new(11), "HOH", dummy_chain_id(1));
        assert_eq!(water.amino_acid, None);
    }

    #[test]
    fn add_atom_keeps_file_order() {
        let mut residue = Residue::new(ResidueNumber::new(5), "ALA", dummy_chain_id(2));
        residue.add_atom(dummy_atom_id(42));
        residue.add_atom(dummy_atom_id(7));
        assert_eq!(residue.atoms(), &[dummy_atom_id(42), dummy_atom_id(7)]);
    }
}
