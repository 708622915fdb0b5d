use crate::core::io::traits::StructureFile;
use crate::core::models::atom::{Atom, Element};
use crate::core::models::chain::ChainType;
use crate::core::models::residue::ResidueNumber;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::identifiers::is_water_residue;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("No ATOM/HETATM records found")]
    NoAtoms,
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach column 54)")]
    LineTooShort,
}

/// Options controlling which records the PDB reader keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbReadOptions {
    pub skip_hydrogens: bool,
    pub skip_waters: bool,
}

impl Default for PdbReadOptions {
    fn default() -> Self {
        Self {
            skip_hydrogens: false,
            skip_waters: true,
        }
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, columns: &str) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, start + 8);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

/// Fixed-column reader for PDB coordinate files.
///
/// Only the first model is read. Of alternate locations, only blank and `A`
/// are kept.
pub struct PdbFile;

impl PdbFile {
    pub fn read_with_options(
        reader: &mut impl BufRead,
        options: &PdbReadOptions,
    ) -> Result<MolecularSystem, PdbError> {
        let mut system = MolecularSystem::new();
        let mut atom_count = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ENDMDL" | "END" => break,
                "ATOM" | "HETATM" => {}
                _ => continue,
            }

            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let alt_loc = line.get(16..17).unwrap_or(" ");
            if alt_loc != " " && alt_loc != "A" {
                trace!(line = line_num, alt_loc, "Skipping alternate location");
                continue;
            }

            let name = slice_and_trim(&line, 12, 16);
            if name.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField {
                        columns: "13-16".into(),
                    },
                });
            }
            let residue_name = slice_and_trim(&line, 17, 20);
            if options.skip_waters && is_water_residue(residue_name) {
                continue;
            }

            let element = slice_and_trim(&line, 76, 78)
                .parse::<Element>()
                .unwrap_or_else(|_| Element::from_atom_name(name));
            if options.skip_hydrogens && element == Element::Hydrogen {
                continue;
            }

            let chain_letter = line
                .get(21..22)
                .and_then(|s| s.chars().next())
                .filter(|c| !c.is_whitespace())
                .unwrap_or('A');

            let residue_number_str = slice_and_trim(&line, 22, 26);
            let number: isize = residue_number_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: residue_number_str.into(),
                },
            })?;
            let insertion_code = line
                .get(26..27)
                .and_then(|s| s.chars().next())
                .filter(|c| !c.is_whitespace());

            let x = parse_coordinate(&line, line_num, 30, "31-38")?;
            let y = parse_coordinate(&line, line_num, 38, "39-46")?;
            let z = parse_coordinate(&line, line_num, 46, "47-54")?;

            let chain_type = if record_type == "ATOM" {
                ChainType::Protein
            } else {
                ChainType::Ligand
            };
            let chain_id = system.add_chain(chain_letter, chain_type);
            let residue_number = ResidueNumber {
                number,
                insertion_code,
            };
            let Some(residue_id) = system.add_residue(chain_id, residue_number, residue_name) else {
                continue;
            };

            let atom = Atom::new(name, residue_id, Point3::new(x, y, z)).with_element(element);
            if system.add_atom_to_residue(residue_id, atom).is_some() {
                atom_count += 1;
            }
        }

        if atom_count == 0 {
            return Err(PdbError::NoAtoms);
        }
        debug!(
            atoms = atom_count,
            chains = system.chains_iter().count(),
            "Parsed PDB structure"
        );
        Ok(system)
    }
}

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        Self::read_with_options(reader, &PdbReadOptions::default())
    }
}
