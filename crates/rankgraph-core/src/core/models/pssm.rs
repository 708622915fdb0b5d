use super::amino_acid::AminoAcid;
use super::residue::ResidueNumber;
use std::collections::BTreeMap;

/// One row of a position-specific scoring matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PssmRow {
    /// Conservation scores in [`AminoAcid::ALL`] order.
    pub conservations: [f64; AminoAcid::COUNT],
    pub information_content: f64,
}

impl PssmRow {
    pub fn conservation(&self, amino_acid: AminoAcid) -> f64 {
        self.conservations[amino_acid.index()]
    }
}

/// Per-chain conservation profile keyed by residue number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PssmTable {
    rows: BTreeMap<ResidueNumber, PssmRow>,
}

impl PssmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, residue: ResidueNumber, row: PssmRow) -> Option<PssmRow> {
        self.rows.insert(residue, row)
    }

    pub fn get(&self, residue: ResidueNumber) -> Option<&PssmRow> {
        self.rows.get(&residue)
    }

    pub fn contains(&self, residue: ResidueNumber) -> bool {
        self.rows.contains_key(&residue)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResidueNumber, &PssmRow)> {
        self.rows.iter()
    }
}
