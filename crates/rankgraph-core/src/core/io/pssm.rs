use crate::core::models::amino_acid::AminoAcid;
use crate::core::models::pssm::{PssmRow, PssmTable};
use crate::core::models::residue::ResidueNumber;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const RESIDUE_NUMBER_COLUMN: &str = "pdbresi";
const RESIDUE_NAME_COLUMN: &str = "pdbresn";
const INFORMATION_CONTENT_COLUMN: &str = "IC";

#[derive(Debug, Error)]
pub enum PssmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("PSSM file is empty")]
    MissingHeader,
    #[error("PSSM header is missing column '{0}'")]
    MissingColumn(String),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Duplicate PSSM row for residue {0}")]
    DuplicateResidue(ResidueNumber),
}

struct ColumnLayout {
    residue_number: usize,
    residue_name: usize,
    information_content: usize,
    conservations: [usize; AminoAcid::COUNT],
}

impl ColumnLayout {
    fn from_header(header: &str) -> Result<Self, PssmError> {
        let indices: HashMap<&str, usize> = header
            .split_whitespace()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        let column = |name: &str| {
            indices
                .get(name)
                .copied()
                .ok_or_else(|| PssmError::MissingColumn(name.to_string()))
        };

        let mut conservations = [0usize; AminoAcid::COUNT];
        for amino_acid in AminoAcid::ALL {
            let letter = amino_acid.one_letter_code().to_string();
            conservations[amino_acid.index()] = column(&letter)?;
        }

        Ok(Self {
            residue_number: column(RESIDUE_NUMBER_COLUMN)?,
            residue_name: column(RESIDUE_NAME_COLUMN)?,
            information_content: column(INFORMATION_CONTENT_COLUMN)?,
            conservations,
        })
    }
}

/// Reads a whitespace-separated conservation table.
///
/// The first non-empty line is a header naming the columns; `pdbresi` holds
/// the residue number (with an optional insertion-code suffix, e.g. `52A`),
/// `pdbresn` the one-letter amino acid, `IC` the information content and one
/// column per amino acid the conservation scores. Column order is free.
pub fn read_pssm(reader: &mut impl BufRead) -> Result<PssmTable, PssmError> {
    let mut lines = reader.lines().enumerate();

    let layout = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break ColumnLayout::from_header(&line)?;
                }
            }
            None => return Err(PssmError::MissingHeader),
        }
    };

    let mut table = PssmTable::new();
    for (line_num, line) in lines {
        let line = line?;
        let line_num = line_num + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let parse_err = |message: String| PssmError::Parse {
            line: line_num,
            message,
        };
        let field = |index: usize| {
            fields
                .get(index)
                .copied()
                .ok_or_else(|| parse_err(format!("missing column {}", index + 1)))
        };
        let float = |index: usize| -> Result<f64, PssmError> {
            let value = field(index)?;
            value
                .parse::<f64>()
                .map_err(|_| parse_err(format!("invalid number '{value}'")))
        };

        let residue: ResidueNumber = field(layout.residue_number)?
            .parse()
            .map_err(|e| parse_err(format!("{e}")))?;

        let residue_name = field(layout.residue_name)?;
        residue_name
            .parse::<AminoAcid>()
            .map_err(|e| parse_err(format!("{e}")))?;

        let mut conservations = [0.0; AminoAcid::COUNT];
        for (slot, &column) in conservations.iter_mut().zip(layout.conservations.iter()) {
            *slot = float(column)?;
        }
        let row = PssmRow {
            conservations,
            information_content: float(layout.information_content)?,
        };

        if table.insert(residue, row).is_some() {
            return Err(PssmError::DuplicateResidue(residue));
        }
    }

    Ok(table)
}

pub fn read_pssm_from_path<P: AsRef<Path>>(path: P) -> Result<PssmTable, PssmError> {
    let file = File::open(path)?;
    read_pssm(&mut BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "pdbresi pdbresn seqresi seqresn A R N D C Q E G H I L K M F P S T W Y V IC";

    fn row(resi: &str, resn: &str, score_of_w: &str, ic: &str) -> String {
        let mut scores = vec!["0.00"; 20];
        scores[17] = score_of_w;
        format!("{resi} {resn} 1 {resn} {} {ic}", scores.join(" "))
    }

    #[test]
    fn parses_rows_with_insertion_codes() {
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            row("1", "W", "0.90", "1.50"),
            row("52A", "G", "0.10", "0.25")
        );
        let table = read_pssm(&mut Cursor::new(text)).unwrap();
        assert_eq!(table.len(), 2);

        let first = table.get(ResidueNumber::new(1)).unwrap();
        assert_eq!(first.conservation(AminoAcid::Tryptophan), 0.90);
        assert_eq!(first.information_content, 1.50);

        let inserted = table
            .get(ResidueNumber::with_insertion_code(52, 'A'))
            .unwrap();
        assert_eq!(inserted.conservation(AminoAcid::Tryptophan), 0.10);
        assert!(table.get(ResidueNumber::new(52)).is_none());
    }

    #[test]
    fn column_order_follows_header() {
        let header = "IC pdbresn pdbresi V Y W T S P F M K L I H G E Q C D N R A";
        let mut scores = vec!["0.00"; 20];
        scores[2] = "0.70"; // W in reversed order
        let text = format!("{header}\n0.3 W 7 {}\n", scores.join(" "));
        let table = read_pssm(&mut Cursor::new(text)).unwrap();
        let row = table.get(ResidueNumber::new(7)).unwrap();
        assert_eq!(row.conservation(AminoAcid::Tryptophan), 0.70);
        assert_eq!(row.information_content, 0.3);
    }

    #[test]
    fn reports_missing_columns_and_bad_values() {
        let missing = "pdbresi pdbresn A R N\n";
        assert!(matches!(
            read_pssm(&mut Cursor::new(missing)),
            Err(PssmError::MissingColumn(_))
        ));

        let text = format!("{HEADER}\n{}\n", row("3", "W", "abc", "0.0"));
        assert!(matches!(
            read_pssm(&mut Cursor::new(text)),
            Err(PssmError::Parse { line: 2, .. })
        ));

        let text = format!("{HEADER}\n{}\n", row("3", "X", "0.5", "0.0"));
        assert!(matches!(
            read_pssm(&mut Cursor::new(text)),
            Err(PssmError::Parse { .. })
        ));

        assert!(matches!(
            read_pssm(&mut Cursor::new("")),
            Err(PssmError::MissingHeader)
        ));
    }

    #[test]
    fn rejects_duplicate_residues() {
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            row("4", "A", "0.0", "0.0"),
            row("4", "A", "0.0", "0.0")
        );
        assert!(matches!(
            read_pssm(&mut Cursor::new(text)),
            Err(PssmError::DuplicateResidue(_))
        ));
    }

    #[test]
    fn reads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.pssm");
        std::fs::write(&path, format!("{HEADER}\n{}\n", row("9", "K", "0.0", "2.0"))).unwrap();
        let table = read_pssm_from_path(&path).unwrap();
        assert_eq!(table.get(ResidueNumber::new(9)).unwrap().information_content, 2.0);
    }
}
