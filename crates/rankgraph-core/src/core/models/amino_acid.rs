use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The twenty standard amino acids.
///
/// The declaration order is the column order of position-specific scoring
/// matrices (`ARNDCQEGHILKMFPSTWYV`), which is also the one-hot order used for
/// residue-type and conservation features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Alanine,
    Arginine,
    Asparagine,
    AsparticAcid,
    Cysteine,
    Glutamine,
    GlutamicAcid,
    Glycine,
    Histidine,
    Isoleucine,
    Leucine,
    Lysine,
    Methionine,
    Phenylalanine,
    Proline,
    Serine,
    Threonine,
    Tryptophan,
    Tyrosine,
    Valine,
}

/// Side-chain polarity class, one-hot encoded as a node feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Nonpolar,
    Polar,
    NegativeCharge,
    PositiveCharge,
}

impl Polarity {
    pub const COUNT: usize = 4;

    pub fn one_hot(&self) -> [f64; Self::COUNT] {
        let mut encoding = [0.0; Self::COUNT];
        encoding[*self as usize] = 1.0;
        encoding
    }
}

static THREE_LETTER_CODES: Map<&'static str, AminoAcid> = phf_map! {
    "ALA" => AminoAcid::Alanine,
    "ARG" => AminoAcid::Arginine,
    "ASN" => AminoAcid::Asparagine,
    "ASP" => AminoAcid::AsparticAcid,
    "CYS" => AminoAcid::Cysteine,
    "CYX" => AminoAcid::Cysteine,
    "GLN" => AminoAcid::Glutamine,
    "GLU" => AminoAcid::GlutamicAcid,
    "GLY" => AminoAcid::Glycine,
    "HIS" => AminoAcid::Histidine,
    "HSD" => AminoAcid::Histidine,
    "HSE" => AminoAcid::Histidine,
    "HSP" => AminoAcid::Histidine,
    "ILE" => AminoAcid::Isoleucine,
    "LEU" => AminoAcid::Leucine,
    "LYS" => AminoAcid::Lysine,
    "MET" => AminoAcid::Methionine,
    "MSE" => AminoAcid::Methionine,
    "PHE" => AminoAcid::Phenylalanine,
    "PRO" => AminoAcid::Proline,
    "SER" => AminoAcid::Serine,
    "THR" => AminoAcid::Threonine,
    "TRP" => AminoAcid::Tryptophan,
    "TYR" => AminoAcid::Tyrosine,
    "VAL" => AminoAcid::Valine,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown amino acid code: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl AminoAcid {
    pub const COUNT: usize = 20;

    pub const ALL: [AminoAcid; Self::COUNT] = [
        AminoAcid::Alanine,
        AminoAcid::Arginine,
        AminoAcid::Asparagine,
        AminoAcid::AsparticAcid,
        AminoAcid::Cysteine,
        AminoAcid::Glutamine,
        AminoAcid::GlutamicAcid,
        AminoAcid::Glycine,
        AminoAcid::Histidine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Lysine,
        AminoAcid::Methionine,
        AminoAcid::Phenylalanine,
        AminoAcid::Proline,
        AminoAcid::Serine,
        AminoAcid::Threonine,
        AminoAcid::Tryptophan,
        AminoAcid::Tyrosine,
        AminoAcid::Valine,
    ];

    /// Looks up a residue name as found in structure files, including common
    /// protonation-state and modified-residue aliases.
    pub fn from_three_letter(code: &str) -> Option<Self> {
        THREE_LETTER_CODES
            .get(code.trim().to_ascii_uppercase().as_str())
            .copied()
    }

    pub fn from_one_letter(code: char) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|aa| aa.one_letter_code() == code.to_ascii_uppercase())
            .copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn one_letter_code(&self) -> char {
        match self {
            AminoAcid::Alanine => 'A',
            AminoAcid::Arginine => 'R',
            AminoAcid::Asparagine => 'N',
            AminoAcid::AsparticAcid => 'D',
            AminoAcid::Cysteine => 'C',
            AminoAcid::Glutamine => 'Q',
            AminoAcid::GlutamicAcid => 'E',
            AminoAcid::Glycine => 'G',
            AminoAcid::Histidine => 'H',
            AminoAcid::Isoleucine => 'I',
            AminoAcid::Leucine => 'L',
            AminoAcid::Lysine => 'K',
            AminoAcid::Methionine => 'M',
            AminoAcid::Phenylalanine => 'F',
            AminoAcid::Proline => 'P',
            AminoAcid::Serine => 'S',
            AminoAcid::Threonine => 'T',
            AminoAcid::Tryptophan => 'W',
            AminoAcid::Tyrosine => 'Y',
            AminoAcid::Valine => 'V',
        }
    }

    pub fn three_letter_code(&self) -> &'static str {
        match self {
            AminoAcid::Alanine => "ALA",
            AminoAcid::Arginine => "ARG",
            AminoAcid::Asparagine => "ASN",
            AminoAcid::AsparticAcid => "ASP",
            AminoAcid::Cysteine => "CYS",
            AminoAcid::Glutamine => "GLN",
            AminoAcid::GlutamicAcid => "GLU",
            AminoAcid::Glycine => "GLY",
            AminoAcid::Histidine => "HIS",
            AminoAcid::Isoleucine => "ILE",
            AminoAcid::Leucine => "LEU",
            AminoAcid::Lysine => "LYS",
            AminoAcid::Methionine => "MET",
            AminoAcid::Phenylalanine => "PHE",
            AminoAcid::Proline => "PRO",
            AminoAcid::Serine => "SER",
            AminoAcid::Threonine => "THR",
            AminoAcid::Tryptophan => "TRP",
            AminoAcid::Tyrosine => "TYR",
            AminoAcid::Valine => "VAL",
        }
    }

    /// Formal side-chain charge at neutral pH.
    pub fn charge(&self) -> f64 {
        match self {
            AminoAcid::Arginine | AminoAcid::Lysine => 1.0,
            AminoAcid::AsparticAcid | AminoAcid::GlutamicAcid => -1.0,
            _ => 0.0,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            AminoAcid::Alanine
            | AminoAcid::Glycine
            | AminoAcid::Isoleucine
            | AminoAcid::Leucine
            | AminoAcid::Methionine
            | AminoAcid::Phenylalanine
            | AminoAcid::Proline
            | AminoAcid::Tryptophan
            | AminoAcid::Valine => Polarity::Nonpolar,
            AminoAcid::Asparagine
            | AminoAcid::Cysteine
            | AminoAcid::Glutamine
            | AminoAcid::Histidine
            | AminoAcid::Serine
            | AminoAcid::Threonine
            | AminoAcid::Tyrosine => Polarity::Polar,
            AminoAcid::AsparticAcid | AminoAcid::GlutamicAcid => Polarity::NegativeCharge,
            AminoAcid::Arginine | AminoAcid::Lysine => Polarity::PositiveCharge,
        }
    }

    pub fn one_hot(&self) -> [f64; Self::COUNT] {
        let mut encoding = [0.0; Self::COUNT];
        encoding[self.index()] = 1.0;
        encoding
    }
}

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    /// Accepts either a one-letter or a three-letter code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let parsed = match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_one_letter(c),
            _ => Self::from_three_letter(trimmed),
        };
        parsed.ok_or_else(|| ParseAminoAcidError(s.to_string()))
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.three_letter_code())
    }
}
