use super::contacts::AtomicCutoffs;
use crate::core::models::amino_acid::AminoAcid;
use crate::core::models::residue::ResidueNumber;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive distance, got {value}"),
        })
    }
}

/// Conservation table paths per chain letter.
pub type PssmPaths = BTreeMap<char, PathBuf>;

/// Target values stored with a query's graph.
pub type Targets = BTreeMap<String, f64>;

/// A single-residue variant, studied on an atom-level graph around the residue.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantQueryConfig {
    pub pdb_path: PathBuf,
    pub chain: char,
    pub residue: ResidueNumber,
    pub wildtype: AminoAcid,
    pub variant: AminoAcid,
    pub pssm_paths: PssmPaths,
    /// Residues with any atom within this distance of the variant residue are included.
    pub radius: f64,
    pub cutoffs: AtomicCutoffs,
    pub targets: Targets,
}

/// A protein-protein interface between two chains, studied on a residue-level graph.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceQueryConfig {
    pub pdb_path: PathBuf,
    pub chain1: char,
    pub chain2: char,
    pub pssm_paths: PssmPaths,
    pub interface_cutoff: f64,
    pub internal_cutoff: f64,
    pub targets: Targets,
}

#[derive(Default)]
pub struct VariantQueryBuilder {
    pdb_path: Option<PathBuf>,
    chain: Option<char>,
    residue: Option<ResidueNumber>,
    wildtype: Option<AminoAcid>,
    variant: Option<AminoAcid>,
    pssm_paths: PssmPaths,
    radius: Option<f64>,
    nonbonded_cutoff: Option<f64>,
    bonded_cutoff: Option<f64>,
    disulfide_cutoff: Option<f64>,
    targets: Targets,
}

impl VariantQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdb_path = Some(path.into());
        self
    }
    pub fn chain(mut self, chain: char) -> Self {
        self.chain = Some(chain);
        self
    }
    pub fn residue(mut self, residue: ResidueNumber) -> Self {
        self.residue = Some(residue);
        self
    }
    pub fn wildtype(mut self, amino_acid: AminoAcid) -> Self {
        self.wildtype = Some(amino_acid);
        self
    }
    pub fn variant(mut self, amino_acid: AminoAcid) -> Self {
        self.variant = Some(amino_acid);
        self
    }
    pub fn pssm_path(mut self, chain: char, path: impl Into<PathBuf>) -> Self {
        self.pssm_paths.insert(chain, path.into());
        self
    }
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
    pub fn nonbonded_cutoff(mut self, cutoff: f64) -> Self {
        self.nonbonded_cutoff = Some(cutoff);
        self
    }
    pub fn bonded_cutoff(mut self, cutoff: f64) -> Self {
        self.bonded_cutoff = Some(cutoff);
        self
    }
    pub fn disulfide_cutoff(mut self, cutoff: f64) -> Self {
        self.disulfide_cutoff = Some(cutoff);
        self
    }
    pub fn target(mut self, name: impl Into<String>, value: f64) -> Self {
        self.targets.insert(name.into(), value);
        self
    }
    pub fn targets(mut self, targets: Targets) -> Self {
        self.targets.extend(targets);
        self
    }

    pub fn build(self) -> Result<VariantQueryConfig, ConfigError> {
        let defaults = AtomicCutoffs::default();
        let cutoffs = AtomicCutoffs {
            nonbonded: positive(
                "nonbonded_cutoff",
                self.nonbonded_cutoff.unwrap_or(defaults.nonbonded),
            )?,
            bonded: positive("bonded_cutoff", self.bonded_cutoff.unwrap_or(defaults.bonded))?,
            disulfide: positive(
                "disulfide_cutoff",
                self.disulfide_cutoff.unwrap_or(defaults.disulfide),
            )?,
        };
        Ok(VariantQueryConfig {
            pdb_path: self
                .pdb_path
                .ok_or(ConfigError::MissingParameter("pdb_path"))?,
            chain: self.chain.ok_or(ConfigError::MissingParameter("chain"))?,
            residue: self
                .residue
                .ok_or(ConfigError::MissingParameter("residue"))?,
            wildtype: self
                .wildtype
                .ok_or(ConfigError::MissingParameter("wildtype"))?,
            variant: self
                .variant
                .ok_or(ConfigError::MissingParameter("variant"))?,
            pssm_paths: self.pssm_paths,
            radius: positive("radius", self.radius.unwrap_or(10.0))?,
            cutoffs,
            targets: self.targets,
        })
    }
}

#[derive(Default)]
pub struct InterfaceQueryBuilder {
    pdb_path: Option<PathBuf>,
    chain1: Option<char>,
    chain2: Option<char>,
    pssm_paths: PssmPaths,
    interface_cutoff: Option<f64>,
    internal_cutoff: Option<f64>,
    targets: Targets,
}

impl InterfaceQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdb_path = Some(path.into());
        self
    }
    pub fn chains(mut self, chain1: char, chain2: char) -> Self {
        self.chain1 = Some(chain1);
        self.chain2 = Some(chain2);
        self
    }
    pub fn pssm_path(mut self, chain: char, path: impl Into<PathBuf>) -> Self {
        self.pssm_paths.insert(chain, path.into());
        self
    }
    pub fn interface_cutoff(mut self, cutoff: f64) -> Self {
        self.interface_cutoff = Some(cutoff);
        self
    }
    pub fn internal_cutoff(mut self, cutoff: f64) -> Self {
        self.internal_cutoff = Some(cutoff);
        self
    }
    pub fn target(mut self, name: impl Into<String>, value: f64) -> Self {
        self.targets.insert(name.into(), value);
        self
    }
    pub fn targets(mut self, targets: Targets) -> Self {
        self.targets.extend(targets);
        self
    }

    pub fn build(self) -> Result<InterfaceQueryConfig, ConfigError> {
        let chain1 = self.chain1.ok_or(ConfigError::MissingParameter("chain1"))?;
        let chain2 = self.chain2.ok_or(ConfigError::MissingParameter("chain2"))?;
        if chain1 == chain2 {
            return Err(ConfigError::InvalidParameter {
                name: "chain2",
                reason: format!("interface chains must differ, both are '{chain1}'"),
            });
        }
        Ok(InterfaceQueryConfig {
            pdb_path: self
                .pdb_path
                .ok_or(ConfigError::MissingParameter("pdb_path"))?,
            chain1,
            chain2,
            pssm_paths: self.pssm_paths,
            interface_cutoff: positive("interface_cutoff", self.interface_cutoff.unwrap_or(8.5))?,
            internal_cutoff: positive("internal_cutoff", self.internal_cutoff.unwrap_or(3.0))?,
            targets: self.targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_builder_applies_defaults() {
        let config = VariantQueryBuilder::new()
            .pdb_path("101M.pdb")
            .chain('A')
            .residue(ResidueNumber::new(27))
            .wildtype(AminoAcid::Threonine)
            .variant(AminoAcid::Alanine)
            .build()
            .unwrap();
        assert_eq!(config.radius, 10.0);
        assert_eq!(config.cutoffs, AtomicCutoffs::default());
        assert!(config.pssm_paths.is_empty());
    }

    #[test]
    fn variant_builder_reports_missing_parameters() {
        let err = VariantQueryBuilder::new()
            .pdb_path("101M.pdb")
            .chain('A')
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("residue"));
    }

    #[test]
    fn interface_builder_validates_chains_and_cutoffs() {
        let config = InterfaceQueryBuilder::new()
            .pdb_path("1ATN.pdb")
            .chains('A', 'B')
            .pssm_path('A', "1ATN.A.pssm")
            .target("irmsd", 0.5)
            .build()
            .unwrap();
        assert_eq!(config.interface_cutoff, 8.5);
        assert_eq!(config.internal_cutoff, 3.0);
        assert_eq!(config.targets["irmsd"], 0.5);

        let same = InterfaceQueryBuilder::new()
            .pdb_path("1ATN.pdb")
            .chains('A', 'A')
            .build();
        assert!(matches!(same, Err(ConfigError::InvalidParameter { .. })));

        let negative = InterfaceQueryBuilder::new()
            .pdb_path("1ATN.pdb")
            .chains('A', 'B')
            .interface_cutoff(-1.0)
            .build();
        assert!(matches!(
            negative,
            Err(ConfigError::InvalidParameter {
                name: "interface_cutoff",
                ..
            })
        ));
    }
}
