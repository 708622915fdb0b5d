use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use rankgraph::core::export::container::WritePolicy;
use rankgraph::core::grid::settings::{GridSettings, MapMethod};
use rankgraph::core::io::targets::{TargetTable, load_targets};
use rankgraph::core::models::amino_acid::AminoAcid;
use rankgraph::core::models::residue::ResidueNumber;
use rankgraph::engine::config::{InterfaceQueryBuilder, Targets, VariantQueryBuilder};
use rankgraph::engine::query::{InterfaceResidueQuery, Query, VariantAtomicQuery};
use rankgraph::workflows::dataset::{ExportOptions, GridExport, QueryDataset};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileGridConfig {
    points_counts: [usize; 3],
    sizes: [f64; 3],
    kernel_width: Option<f64>,
    #[serde(default = "default_map_method")]
    method: MapMethod,
}

fn default_map_method() -> MapMethod {
    MapMethod::FastGaussian
}

impl From<FileGridConfig> for GridExport {
    fn from(p: FileGridConfig) -> Self {
        Self {
            settings: GridSettings {
                points_counts: p.points_counts,
                sizes: p.sizes,
                kernel_width: p.kernel_width,
            },
            method: p.method,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum FileResidueNumber {
    Number(isize),
    Text(String),
}

impl FileResidueNumber {
    fn parse(&self) -> Result<ResidueNumber> {
        match self {
            FileResidueNumber::Number(n) => Ok(ResidueNumber::new(*n)),
            FileResidueNumber::Text(s) => s
                .parse()
                .map_err(|e| CliError::Config(format!("{e}"))),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileInterfaceQuery {
    pdb: PathBuf,
    chains: [char; 2],
    #[serde(default)]
    pssm: BTreeMap<char, PathBuf>,
    interface_cutoff: Option<f64>,
    internal_cutoff: Option<f64>,
    #[serde(default)]
    targets: Targets,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileVariantQuery {
    pdb: PathBuf,
    chain: char,
    residue: FileResidueNumber,
    wildtype: String,
    variant: String,
    #[serde(default)]
    pssm: BTreeMap<char, PathBuf>,
    radius: Option<f64>,
    nonbonded_cutoff: Option<f64>,
    bonded_cutoff: Option<f64>,
    disulfide_cutoff: Option<f64>,
    #[serde(default)]
    targets: Targets,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum FileQuery {
    Interface(FileInterfaceQuery),
    Variant(FileVariantQuery),
}

/// A build job as written in its TOML file.
///
/// Relative paths are resolved against the directory of the job file.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct JobFile {
    output: PathBuf,
    #[serde(default)]
    overwrite: bool,
    targets_csv: Option<PathBuf>,
    grid: Option<FileGridConfig>,
    #[serde(default)]
    queries: Vec<FileQuery>,
}

/// A fully resolved build job.
pub struct Job {
    pub output: PathBuf,
    pub options: ExportOptions,
    pub dataset: QueryDataset,
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn parse_amino_acid(code: &str) -> Result<AminoAcid> {
    code.parse()
        .map_err(|e| CliError::Config(format!("{e}")))
}

/// Adds the table's targets for `id` without replacing targets set inline.
fn merge_targets(targets: &mut Targets, id: &str, table: &TargetTable) {
    if let Some(row) = table.get(id) {
        for (name, value) in row {
            targets.entry(name.clone()).or_insert(*value);
        }
    }
}

impl JobFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolves paths, loads the targets table and builds every query.
    pub fn resolve(self, base_dir: &Path, args: &BuildArgs) -> Result<Job> {
        let output = match &args.output {
            Some(path) => path.clone(),
            None => resolve_path(base_dir, &self.output),
        };

        let table = match &self.targets_csv {
            Some(path) => {
                let path = resolve_path(base_dir, path);
                info!("Loading targets from {:?}", path);
                load_targets(&path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?
            }
            None => TargetTable::new(),
        };

        let mut dataset = QueryDataset::new();
        let mut seen = HashSet::new();
        for query in self.queries {
            let query = build_query(query, base_dir, &table)?;
            let id = query.query_id();
            if !seen.insert(id.clone()) {
                return Err(CliError::Config(format!(
                    "Query '{id}' appears more than once in the job"
                )));
            }
            dataset.add_boxed(query);
        }
        if dataset.is_empty() {
            return Err(CliError::Config("The job defines no queries".to_string()));
        }

        let unmatched = table.keys().filter(|id| !seen.contains(*id)).count();
        if unmatched > 0 {
            warn!(unmatched, "Rows of the targets table match no query");
        }

        let overwrite = args.overwrite || self.overwrite;
        let options = ExportOptions {
            grid: if args.no_grid {
                None
            } else {
                self.grid.map(Into::into)
            },
            policy: if overwrite {
                WritePolicy::Overwrite
            } else {
                WritePolicy::Fail
            },
        };

        Ok(Job {
            output,
            options,
            dataset,
        })
    }
}

fn build_query(query: FileQuery, base_dir: &Path, table: &TargetTable) -> Result<Box<dyn Query>> {
    let config_error = |e: rankgraph::engine::config::ConfigError| CliError::Config(e.to_string());
    match query {
        FileQuery::Interface(q) => {
            let [chain1, chain2] = q.chains;
            let mut builder = InterfaceQueryBuilder::new()
                .pdb_path(resolve_path(base_dir, &q.pdb))
                .chains(chain1, chain2)
                .targets(q.targets);
            for (chain, path) in &q.pssm {
                builder = builder.pssm_path(*chain, resolve_path(base_dir, path));
            }
            if let Some(cutoff) = q.interface_cutoff {
                builder = builder.interface_cutoff(cutoff);
            }
            if let Some(cutoff) = q.internal_cutoff {
                builder = builder.internal_cutoff(cutoff);
            }
            let mut config = builder.build().map_err(config_error)?;
            let id = InterfaceResidueQuery::new(config.clone()).query_id();
            merge_targets(&mut config.targets, &id, table);
            Ok(Box::new(InterfaceResidueQuery::new(config)))
        }
        FileQuery::Variant(q) => {
            let mut builder = VariantQueryBuilder::new()
                .pdb_path(resolve_path(base_dir, &q.pdb))
                .chain(q.chain)
                .residue(q.residue.parse()?)
                .wildtype(parse_amino_acid(&q.wildtype)?)
                .variant(parse_amino_acid(&q.variant)?)
                .targets(q.targets);
            for (chain, path) in &q.pssm {
                builder = builder.pssm_path(*chain, resolve_path(base_dir, path));
            }
            if let Some(radius) = q.radius {
                builder = builder.radius(radius);
            }
            if let Some(cutoff) = q.nonbonded_cutoff {
                builder = builder.nonbonded_cutoff(cutoff);
            }
            if let Some(cutoff) = q.bonded_cutoff {
                builder = builder.bonded_cutoff(cutoff);
            }
            if let Some(cutoff) = q.disulfide_cutoff {
                builder = builder.disulfide_cutoff(cutoff);
            }
            let mut config = builder.build().map_err(config_error)?;
            let id = VariantAtomicQuery::new(config.clone()).query_id();
            merge_targets(&mut config.targets, &id, table);
            Ok(Box::new(VariantAtomicQuery::new(config)))
        }
    }
}
