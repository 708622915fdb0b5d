use thiserror::Error;

use super::config::ConfigError;
use crate::core::export::container::ExportError;
use crate::core::graph::feature::SchemaError;
use crate::core::graph::graph::GraphError;
use crate::core::grid::settings::GridError;
use crate::core::io::pdb::PdbError;
use crate::core::io::pssm::PssmError;
use crate::core::models::residue::ResidueNumber;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Chain '{chain}' not found in {model}")]
    ChainNotFound { model: String, chain: char },

    #[error("Residue {chain}:{residue} not found in {model}")]
    ResidueNotFound {
        model: String,
        chain: char,
        residue: ResidueNumber,
    },

    #[error("No interface residues found between chains {chain1} and {chain2} of {model}")]
    EmptyInterface {
        model: String,
        chain1: char,
        chain2: char,
    },

    #[error("Query '{0}' produced an empty graph")]
    EmptyResult(String),

    #[error("Failed to read structure '{path}': {source}")]
    Structure {
        path: String,
        #[source]
        source: PdbError,
    },

    #[error("Failed to read conservation table '{path}': {source}")]
    Conservation {
        path: String,
        #[source]
        source: PssmError,
    },

    #[error("Feature '{feature}' failed: {message}")]
    Feature { feature: String, message: String },

    #[error("Invalid query configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema inconsistency: {0}")]
    Schema(#[from] SchemaError),

    #[error("Graph construction failed: {0}")]
    Graph(#[from] GraphError),

    #[error("Grid projection failed: {0}")]
    Grid(#[from] GridError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}
