use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Name of the column holding the query id.
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Error)]
pub enum TargetsLoadError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Targets table '{path}' has no 'id' column")]
    MissingIdColumn { path: String },
    #[error("Invalid value '{value}' for target '{target}' of query '{id}'")]
    InvalidValue {
        id: String,
        target: String,
        value: String,
    },
}

/// Target values per query id.
pub type TargetTable = HashMap<String, BTreeMap<String, f64>>;

/// Loads a CSV table with an `id` column and one numeric column per target.
///
/// Empty cells are skipped, so queries may carry different target subsets.
pub fn load_targets(path: &Path) -> Result<TargetTable, TargetsLoadError> {
    let path_str = || path.to_string_lossy().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|e| TargetsLoadError::Csv {
        path: path_str(),
        source: e,
    })?;

    let headers = reader
        .headers()
        .map_err(|e| TargetsLoadError::Csv {
            path: path_str(),
            source: e,
        })?
        .clone();
    let id_index = headers
        .iter()
        .position(|h| h.trim() == ID_COLUMN)
        .ok_or_else(|| TargetsLoadError::MissingIdColumn { path: path_str() })?;

    let mut table = TargetTable::new();
    for result in reader.records() {
        let record = result.map_err(|e| TargetsLoadError::Csv {
            path: path_str(),
            source: e,
        })?;
        let id = record.get(id_index).unwrap_or_default().trim().to_string();
        let mut targets = BTreeMap::new();
        for (index, (header, value)) in headers.iter().zip(record.iter()).enumerate() {
            let value = value.trim();
            if index == id_index || value.is_empty() {
                continue;
            }
            let parsed = value
                .parse::<f64>()
                .map_err(|_| TargetsLoadError::InvalidValue {
                    id: id.clone(),
                    target: header.trim().to_string(),
                    value: value.to_string(),
                })?;
            targets.insert(header.trim().to_string(), parsed);
        }
        table.entry(id).or_default().extend(targets);
    }
    Ok(table)
}
