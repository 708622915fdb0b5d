use super::tensor::StoredTensor;
use crate::core::graph::entity::NodeKind;
use crate::core::graph::feature::{FeatureShape, FeatureValue, SchemaError};
use crate::core::graph::graph::{FeatureMap, Graph};
use crate::core::grid::grid::Grid;
use crate::core::grid::settings::MapMethod;
use safetensors::{SafeTensorError, SafeTensors};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const NODE_FEATURES: &str = "node_features";
pub const EDGE_FEATURES: &str = "edge_features";
pub const EDGE_INDEX: &str = "_index";
pub const NODE_IDS: &str = "_ids";
pub const MAPPED_FEATURES: &str = "mapped_features";
pub const GRID_POINTS: &str = "grid_points";

const FORMAT_KEY: &str = "__format__";
const FORMAT_VERSION: &str = "rankgraph-container/1";
const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];
/// Largest header the safetensors reader accepts.
pub const MAX_HEADER_SIZE: usize = 100_000_000;

/// The two independently writable parts of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Graph,
    Grid,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Graph => write!(f, "graph"),
            Section::Grid => write!(f, "grid"),
        }
    }
}

/// What to do when the section being written already exists in the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    #[default]
    Fail,
    Overwrite,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Container format error: {0}")]
    Format(#[from] SafeTensorError),
    #[error("Invalid manifest for entry '{entry}': {source}")]
    Manifest {
        entry: String,
        source: serde_json::Error,
    },
    #[error("Entry '{entry}' already has a {section} section")]
    SectionExists { entry: String, section: Section },
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),
    #[error("Invalid entry id '{0}': ids must be non-empty, without '/' and not start with '__'")]
    InvalidEntryId(String),
    #[error("Graph '{0}' has no nodes")]
    EmptyGraph(String),
    #[error("Inconsistent feature schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Corrupt container data for '{0}'")]
    Corrupt(String),
    #[error("Container header of {size} bytes exceeds the {limit}-byte limit; split the dataset over several containers")]
    HeaderTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GraphManifest {
    pub node_kind: NodeKind,
    /// Node identities in stored row order, kept in the `_ids` tensor on disk.
    #[serde(skip)]
    pub node_ids: Vec<String>,
    pub node_features: BTreeMap<String, FeatureShape>,
    pub edge_features: BTreeMap<String, FeatureShape>,
    pub edge_count: usize,
    #[serde(default)]
    pub targets: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GridManifest {
    pub points_counts: [usize; 3],
    pub sizes: [f64; 3],
    pub center: [f64; 3],
    pub method: MapMethod,
    pub kernel_width: f64,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphManifest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridManifest>,
}

/// One entry read back from a container.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: String,
    pub manifest: EntryManifest,
    pub node_features: BTreeMap<String, StoredTensor>,
    pub edge_features: BTreeMap<String, StoredTensor>,
    /// Endpoint node indices per edge row.
    pub edge_index: Vec<[usize; 2]>,
    pub mapped_features: BTreeMap<String, StoredTensor>,
    pub grid_points: Option<[Vec<f64>; 3]>,
}

fn validate_entry_id(id: &str) -> Result<(), ExportError> {
    if id.is_empty() || id.contains('/') || id.starts_with("__") {
        return Err(ExportError::InvalidEntryId(id.to_string()));
    }
    Ok(())
}

fn tensor_key(entry: &str, group: &str, name: &str) -> String {
    format!("{entry}/{group}/{name}")
}

/// The length prefix of a serialized safetensors buffer.
fn header_size(bytes: &[u8]) -> usize {
    let mut prefix = [0u8; 8];
    if let Some(head) = bytes.get(..8) {
        prefix.copy_from_slice(head);
    }
    u64::from_le_bytes(prefix) as usize
}

fn io_error(path: &Path, source: io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// Stacks one feature across rows into `[rows]` or `[rows, len]`.
fn stack_feature<'a>(
    name: &str,
    shape: FeatureShape,
    rows: impl Iterator<Item = &'a FeatureMap>,
) -> StoredTensor {
    let mut values = Vec::new();
    let mut count = 0usize;
    for features in rows {
        match features.get(name) {
            Some(value) => values.extend_from_slice(value.components()),
            None => values.extend_from_slice(FeatureValue::zeros(shape).components()),
        }
        count += 1;
    }
    let tensor_shape = match shape {
        FeatureShape::Scalar => vec![count],
        FeatureShape::Vector(len) => vec![count, len],
    };
    StoredTensor::from_f64(tensor_shape, &values)
}

/// A multi-entry graph/grid container backed by a single safetensors file.
///
/// Tensors are keyed `<entry>/<section group>/<name>`; per-entry manifests
/// (shapes, targets, grid geometry) live in the file metadata as JSON. Node
/// ids are stored as a byte tensor so the header stays small. The whole container is held in memory and written atomically by
/// [`Container::save`].
#[derive(Debug, Clone)]
pub struct Container {
    path: PathBuf,
    tensors: BTreeMap<String, StoredTensor>,
    manifests: BTreeMap<String, EntryManifest>,
}

impl Container {
    /// Opens an existing container, or starts an empty one if `path` does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "Starting new container");
            return Ok(Self {
                path,
                tensors: BTreeMap::new(),
                manifests: BTreeMap::new(),
            });
        }

        let bytes = fs::read(&path).map_err(|e| io_error(&path, e))?;
        let (_, metadata) = SafeTensors::read_metadata(&bytes)?;
        let mut manifests = BTreeMap::new();
        if let Some(map) = metadata.metadata() {
            for (entry, json) in map.iter().filter(|(k, _)| k.as_str() != FORMAT_KEY) {
                let manifest: EntryManifest =
                    serde_json::from_str(json).map_err(|source| ExportError::Manifest {
                        entry: entry.clone(),
                        source,
                    })?;
                manifests.insert(entry.clone(), manifest);
            }
        }

        let tensors: BTreeMap<String, StoredTensor> = SafeTensors::deserialize(&bytes)?
            .tensors()
            .into_iter()
            .map(|(name, view)| (name, StoredTensor::from_view(&view)))
            .collect();

        for (entry, manifest) in manifests.iter_mut() {
            if let Some(graph) = manifest.graph.as_mut() {
                let key = tensor_key(entry, NODE_FEATURES, NODE_IDS);
                graph.node_ids = tensors
                    .get(&key)
                    .and_then(StoredTensor::to_labels)
                    .ok_or(ExportError::Corrupt(key))?;
            }
        }

        debug!(path = %path.display(), entries = manifests.len(), "Opened container");
        Ok(Self {
            path,
            tensors,
            manifests,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry ids in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.manifests.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.manifests.contains_key(id)
    }

    pub fn manifest(&self, id: &str) -> Option<&EntryManifest> {
        self.manifests.get(id)
    }

    fn claim_section(
        &mut self,
        entry: &str,
        section: Section,
        policy: WritePolicy,
    ) -> Result<(), ExportError> {
        let exists = self.manifests.get(entry).is_some_and(|m| match section {
            Section::Graph => m.graph.is_some(),
            Section::Grid => m.grid.is_some(),
        });
        if exists {
            if policy == WritePolicy::Fail {
                return Err(ExportError::SectionExists {
                    entry: entry.to_string(),
                    section,
                });
            }
            debug!(entry, %section, "Overwriting existing section");
            let groups: &[&str] = match section {
                Section::Graph => &[NODE_FEATURES, EDGE_FEATURES],
                Section::Grid => &[MAPPED_FEATURES, GRID_POINTS],
            };
            let prefixes: Vec<String> = groups.iter().map(|g| format!("{entry}/{g}/")).collect();
            self.tensors
                .retain(|key, _| !prefixes.iter().any(|prefix| key.starts_with(prefix)));
        }
        Ok(())
    }

    /// Stores a graph's node and edge features under the graph id.
    pub fn write_graph(&mut self, graph: &Graph, policy: WritePolicy) -> Result<(), ExportError> {
        let entry = graph.id();
        validate_entry_id(entry)?;
        let node_kind = graph
            .kind()
            .ok_or_else(|| ExportError::EmptyGraph(entry.to_string()))?;
        let schema = graph.infer_schema()?;
        self.claim_section(entry, Section::Graph, policy)?;

        for (name, shape) in schema.node_features() {
            let tensor = stack_feature(name, *shape, graph.nodes().map(|n| &n.features));
            self.tensors
                .insert(tensor_key(entry, NODE_FEATURES, name), tensor);
        }
        for (name, shape) in schema.edge_features() {
            let tensor = stack_feature(name, *shape, graph.edges().map(|e| &e.features));
            self.tensors
                .insert(tensor_key(entry, EDGE_FEATURES, name), tensor);
        }
        let index: Vec<i64> = graph
            .edge_index()
            .into_iter()
            .flat_map(|[a, b]| [a as i64, b as i64])
            .collect();
        self.tensors.insert(
            tensor_key(entry, EDGE_FEATURES, EDGE_INDEX),
            StoredTensor::from_i64(vec![graph.edge_count(), 2], &index),
        );
        let node_ids: Vec<String> = graph.nodes().map(|n| n.entity().to_string()).collect();
        self.tensors.insert(
            tensor_key(entry, NODE_FEATURES, NODE_IDS),
            StoredTensor::from_labels(&node_ids),
        );

        let manifest = GraphManifest {
            node_kind,
            node_ids,
            node_features: schema.node_features().clone(),
            edge_features: schema.edge_features().clone(),
            edge_count: graph.edge_count(),
            targets: graph.targets().clone(),
        };
        self.manifests.entry(entry.to_string()).or_default().graph = Some(manifest);
        debug!(
            entry,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Stored graph section"
        );
        Ok(())
    }

    /// Stores a projected grid under the grid id.
    pub fn write_grid(&mut self, grid: &Grid, policy: WritePolicy) -> Result<(), ExportError> {
        let entry = grid.id();
        validate_entry_id(entry)?;
        self.claim_section(entry, Section::Grid, policy)?;

        let shape = grid.points_counts().to_vec();
        for (name, values) in grid.fields() {
            self.tensors.insert(
                tensor_key(entry, MAPPED_FEATURES, name),
                StoredTensor::from_f64(shape.clone(), values),
            );
        }
        for (axis, axis_name) in AXIS_NAMES.iter().enumerate() {
            let coords = grid.axis(axis);
            self.tensors.insert(
                tensor_key(entry, GRID_POINTS, axis_name),
                StoredTensor::from_f64(vec![coords.len()], coords),
            );
        }

        let center = grid.center();
        let manifest = GridManifest {
            points_counts: grid.points_counts(),
            sizes: grid.settings().sizes,
            center: [center.x, center.y, center.z],
            method: grid.method(),
            kernel_width: grid.settings().sigma(),
            fields: grid.fields().map(|(name, _)| name.to_string()).collect(),
        };
        self.manifests.entry(entry.to_string()).or_default().grid = Some(manifest);
        debug!(entry, fields = grid.field_count(), "Stored grid section");
        Ok(())
    }

    /// Removes an entry with all of its sections.
    pub fn remove_entry(&mut self, id: &str) -> Result<(), ExportError> {
        if self.manifests.remove(id).is_none() {
            return Err(ExportError::EntryNotFound(id.to_string()));
        }
        let prefix = format!("{id}/");
        self.tensors.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    /// Reads one entry back, decoding the edge index.
    pub fn read_entry(&self, id: &str) -> Result<StoredEntry, ExportError> {
        let manifest = self
            .manifests
            .get(id)
            .cloned()
            .ok_or_else(|| ExportError::EntryNotFound(id.to_string()))?;

        let group = |group: &str| -> BTreeMap<String, StoredTensor> {
            let prefix = format!("{id}/{group}/");
            self.tensors
                .iter()
                .filter_map(|(key, tensor)| {
                    key.strip_prefix(&prefix)
                        .map(|name| (name.to_string(), tensor.clone()))
                })
                .collect()
        };

        let mut node_features = group(NODE_FEATURES);
        node_features.remove(NODE_IDS);
        let mut edge_features = group(EDGE_FEATURES);
        let edge_index = match edge_features.remove(EDGE_INDEX) {
            Some(tensor) => tensor
                .to_i64_vec()
                .ok_or_else(|| ExportError::Corrupt(tensor_key(id, EDGE_FEATURES, EDGE_INDEX)))?
                .chunks_exact(2)
                .map(|pair| [pair[0] as usize, pair[1] as usize])
                .collect(),
            None => Vec::new(),
        };

        let points = group(GRID_POINTS);
        let grid_points = if points.is_empty() {
            None
        } else {
            let mut axes: [Vec<f64>; 3] = Default::default();
            for (axis, name) in AXIS_NAMES.iter().enumerate() {
                axes[axis] = points
                    .get(*name)
                    .and_then(StoredTensor::to_f64_vec)
                    .ok_or_else(|| ExportError::Corrupt(tensor_key(id, GRID_POINTS, name)))?;
            }
            Some(axes)
        };

        Ok(StoredEntry {
            id: id.to_string(),
            manifest,
            node_features,
            edge_features,
            edge_index,
            mapped_features: group(MAPPED_FEATURES),
            grid_points,
        })
    }

    /// Copies the named entries into a new container at `destination`.
    pub fn extract(
        &self,
        ids: &[&str],
        destination: impl AsRef<Path>,
    ) -> Result<Container, ExportError> {
        let mut subset = Container::open(destination)?;
        for &id in ids {
            let manifest = self
                .manifests
                .get(id)
                .ok_or_else(|| ExportError::EntryNotFound(id.to_string()))?;
            if subset.contains(id) {
                subset.remove_entry(id)?;
            }
            let prefix = format!("{id}/");
            for (key, tensor) in self.tensors.iter().filter(|(k, _)| k.starts_with(&prefix)) {
                subset.tensors.insert(key.clone(), tensor.clone());
            }
            subset.manifests.insert(id.to_string(), manifest.clone());
        }
        Ok(subset)
    }

    /// Writes the container to its path through a temporary file and a rename.
    ///
    /// Fails with [`ExportError::HeaderTooLarge`] without touching the file
    /// when the result could not be opened again.
    pub fn save(&self) -> Result<(), ExportError> {
        self.save_with_header_limit(MAX_HEADER_SIZE)
    }

    fn save_with_header_limit(&self, limit: usize) -> Result<(), ExportError> {
        let mut metadata: HashMap<String, String> = HashMap::new();
        metadata.insert(FORMAT_KEY.to_string(), FORMAT_VERSION.to_string());
        for (entry, manifest) in &self.manifests {
            let json = serde_json::to_string(manifest).map_err(|source| ExportError::Manifest {
                entry: entry.clone(),
                source,
            })?;
            metadata.insert(entry.clone(), json);
        }

        let bytes = safetensors::serialize(
            self.tensors.iter().map(|(key, tensor)| (key.as_str(), tensor)),
            &Some(metadata),
        )?;
        let size = header_size(&bytes);
        if size > limit {
            return Err(ExportError::HeaderTooLarge { size, limit });
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "container".to_string());
        let temp_path = self.path.with_file_name(format!(".{file_name}.tmp"));
        fs::write(&temp_path, &bytes).map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| io_error(&self.path, e))?;

        info!(
            path = %self.path.display(),
            entries = self.manifests.len(),
            tensors = self.tensors.len(),
            "Saved container"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::contact::Contact;
    use crate::core::graph::entity::test_support::residue_entity;
    use crate::core::grid::mapping::map_graph;
    use crate::core::grid::settings::GridSettings;
    use tempfile::tempdir;

    fn graph_with_id(id: &str, scale: f64) -> Graph {
        let a = residue_entity('A', 1, [0.0, 0.0, 0.0]);
        let b = residue_entity('A', 2, [3.0, 0.0, 0.0]);
        let c = residue_entity('B', 7, [0.0, 4.0, 0.0]);
        let mut graph = Graph::new(id);
        for (x, y) in [(&a, &b), (&a, &c)] {
            let edge = graph
                .add_edge(Contact::new(x.clone(), y.clone()).unwrap())
                .unwrap();
            let dist = edge.contact().distance();
            edge.features.insert("dist".into(), dist.into());
        }
        for (i, node) in graph.nodes_mut().enumerate() {
            node.features
                .insert("charge".into(), (scale * i as f64 + 0.1).into());
            let p = node.position();
            node.features
                .insert("position".into(), [p.x, p.y, p.z].into());
        }
        graph.set_target("irmsd", 1.5 * scale);
        graph
    }

    #[test]
    fn graph_round_trip_is_bit_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graphs.safetensors");
        let graph = graph_with_id("1ABC:A-B", 1.0);

        let mut container = Container::open(&path).unwrap();
        container.write_graph(&graph, WritePolicy::Fail).unwrap();
        container.save().unwrap();

        let reopened = Container::open(&path).unwrap();
        let entry = reopened.read_entry("1ABC:A-B").unwrap();
        let manifest = entry.manifest.graph.as_ref().unwrap();
        assert_eq!(manifest.node_kind, NodeKind::Residue);
        assert_eq!(manifest.node_ids, vec!["A:1", "A:2", "B:7"]);
        assert_eq!(manifest.targets["irmsd"], 1.5);

        let charge = entry.node_features["charge"].to_f64_vec().unwrap();
        let expected: Vec<f64> = graph
            .nodes()
            .map(|n| match &n.features["charge"] {
                FeatureValue::Scalar(v) => *v,
                FeatureValue::Vector(_) => unreachable!(),
            })
            .collect();
        assert_eq!(
            charge.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            expected.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
        assert_eq!(entry.node_features["position"].shape(), &[3, 3]);

        let dist = entry.edge_features["dist"].to_f64_vec().unwrap();
        assert_eq!(dist, vec![3.0, 4.0]);
        assert!(!entry.edge_features.contains_key(EDGE_INDEX));

        // edge rows resolve back to their endpoint identities
        let endpoints: Vec<(String, String)> = entry
            .edge_index
            .iter()
            .map(|[a, b]| (manifest.node_ids[*a].clone(), manifest.node_ids[*b].clone()))
            .collect();
        let original: Vec<(String, String)> = graph
            .edges()
            .map(|e| {
                (
                    e.contact().first().to_string(),
                    e.contact().second().to_string(),
                )
            })
            .collect();
        assert_eq!(endpoints, original);
    }

    #[test]
    fn entries_coexist_and_are_removed_independently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.safetensors");
        let mut container = Container::open(&path).unwrap();
        container
            .write_graph(&graph_with_id("A", 1.0), WritePolicy::Fail)
            .unwrap();
        container
            .write_graph(&graph_with_id("B", 2.0), WritePolicy::Fail)
            .unwrap();
        container.save().unwrap();

        let mut reopened = Container::open(&path).unwrap();
        assert_eq!(reopened.entries().collect::<Vec<_>>(), vec!["A", "B"]);
        let before_b = reopened.read_entry("B").unwrap();

        reopened.remove_entry("A").unwrap();
        reopened.save().unwrap();

        let after = Container::open(&path).unwrap();
        assert_eq!(after.entries().collect::<Vec<_>>(), vec!["B"]);
        assert!(matches!(
            after.read_entry("A"),
            Err(ExportError::EntryNotFound(_))
        ));
        let after_b = after.read_entry("B").unwrap();
        assert_eq!(after_b.node_features, before_b.node_features);
        assert_eq!(after_b.edge_index, before_b.edge_index);
    }

    #[test]
    fn duplicate_sections_fail_unless_overwritten() {
        let dir = tempdir().unwrap();
        let mut container = Container::open(dir.path().join("dup.safetensors")).unwrap();
        container
            .write_graph(&graph_with_id("A", 1.0), WritePolicy::Fail)
            .unwrap();
        container
            .write_graph(&graph_with_id("B", 1.0), WritePolicy::Fail)
            .unwrap();

        let err = container
            .write_graph(&graph_with_id("A", 5.0), WritePolicy::Fail)
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::SectionExists {
                section: Section::Graph,
                ..
            }
        ));

        let untouched_b = container.read_entry("B").unwrap();
        container
            .write_graph(&graph_with_id("A", 5.0), WritePolicy::Overwrite)
            .unwrap();
        let a = container.read_entry("A").unwrap();
        assert_eq!(a.manifest.graph.unwrap().targets["irmsd"], 7.5);
        assert_eq!(
            container.read_entry("B").unwrap().node_features,
            untouched_b.node_features
        );
    }

    #[test]
    fn graph_and_grid_share_one_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("both.safetensors");
        let graph = graph_with_id("test", 1.0);
        let grid = map_graph(&graph, &GridSettings::cubic(20, 20.0), MapMethod::FastGaussian).unwrap();

        let mut container = Container::open(&path).unwrap();
        container.write_graph(&graph, WritePolicy::Fail).unwrap();
        container.write_grid(&grid, WritePolicy::Fail).unwrap();
        container.save().unwrap();

        let entry = Container::open(&path).unwrap().read_entry("test").unwrap();
        let grid_manifest = entry.manifest.grid.as_ref().unwrap();
        assert_eq!(grid_manifest.method, MapMethod::FastGaussian);
        for field in ["charge_000", "dist_000", "position_001"] {
            let tensor = &entry.mapped_features[field];
            assert_eq!(tensor.shape(), &[20, 20, 20]);
            assert!(tensor.to_f64_vec().unwrap().iter().any(|v| *v != 0.0));
        }
        let [xs, ys, zs] = entry.grid_points.unwrap();
        assert_eq!((xs.len(), ys.len(), zs.len()), (20, 20, 20));
        assert!(!entry.node_features.is_empty());
    }

    #[test]
    fn invalid_ids_and_empty_graphs_are_rejected() {
        let dir = tempdir().unwrap();
        let mut container = Container::open(dir.path().join("x.safetensors")).unwrap();
        assert!(matches!(
            container.write_graph(&graph_with_id("a/b", 1.0), WritePolicy::Fail),
            Err(ExportError::InvalidEntryId(_))
        ));
        assert!(matches!(
            container.write_graph(&graph_with_id("__format__", 1.0), WritePolicy::Fail),
            Err(ExportError::InvalidEntryId(_))
        ));
        assert!(matches!(
            container.write_graph(&Graph::new("empty"), WritePolicy::Fail),
            Err(ExportError::EmptyGraph(_))
        ));
        assert!(matches!(
            container.remove_entry("missing"),
            Err(ExportError::EntryNotFound(_))
        ));
    }

    #[test]
    fn inconsistent_feature_sets_are_not_exported() {
        let dir = tempdir().unwrap();
        let mut container = Container::open(dir.path().join("x.safetensors")).unwrap();
        let mut graph = graph_with_id("bad", 1.0);
        if let Some(node) = graph.nodes_mut().next() {
            node.features.remove("charge");
        }
        assert!(matches!(
            container.write_graph(&graph, WritePolicy::Fail),
            Err(ExportError::Schema(_))
        ));
        assert!(!container.contains("bad"));
    }

    #[test]
    fn extract_copies_selected_entries() {
        let dir = tempdir().unwrap();
        let mut container = Container::open(dir.path().join("full.safetensors")).unwrap();
        for id in ["A", "B", "C"] {
            container
                .write_graph(&graph_with_id(id, 1.0), WritePolicy::Fail)
                .unwrap();
        }
        let subset = container
            .extract(&["A", "C"], dir.path().join("subset.safetensors"))
            .unwrap();
        subset.save().unwrap();

        let reopened = Container::open(dir.path().join("subset.safetensors")).unwrap();
        assert_eq!(reopened.entries().collect::<Vec<_>>(), vec!["A", "C"]);
        assert!(container.extract(&["Z"], dir.path().join("z.safetensors")).is_err());
    }

    fn stored_header_size(path: &Path) -> usize {
        header_size(&fs::read(path).unwrap())
    }

    fn chain_graph(id: &str, nodes: usize) -> Graph {
        let mut graph = Graph::new(id);
        let entities: Vec<_> = (0..nodes)
            .map(|i| residue_entity('A', i as isize + 1, [i as f64 * 3.8, 0.0, 0.0]))
            .collect();
        for pair in entities.windows(2) {
            let edge = graph
                .add_edge(Contact::new(pair[0].clone(), pair[1].clone()).unwrap())
                .unwrap();
            let dist = edge.contact().distance();
            edge.features.insert("dist".into(), FeatureValue::Scalar(dist));
        }
        for node in graph.nodes_mut() {
            node.features.insert("charge".into(), FeatureValue::Scalar(0.0));
        }
        graph
    }

    #[test]
    fn header_size_does_not_grow_with_node_count() {
        let dir = tempdir().unwrap();
        let small_path = dir.path().join("small.safetensors");
        let large_path = dir.path().join("large.safetensors");

        export(&small_path, &chain_graph("chain", 10));
        export(&large_path, &chain_graph("chain", 50_000));
        // only shape and offset digits differ
        let small = stored_header_size(&small_path);
        let large = stored_header_size(&large_path);
        assert!(large <= small + 128, "{small} vs {large}");

        let reopened = Container::open(&large_path).unwrap();
        let entry = reopened.read_entry("chain").unwrap();
        let node_ids = &entry.manifest.graph.as_ref().unwrap().node_ids;
        assert_eq!(node_ids.len(), 50_000);
        assert_eq!(node_ids[0], "A:1");
        assert_eq!(node_ids[49_999], "A:50000");
        assert!(!entry.node_features.contains_key(NODE_IDS));
        assert_eq!(entry.node_features["charge"].shape(), &[50_000]);
    }

    fn export(path: &Path, graph: &Graph) {
        let mut container = Container::open(path).unwrap();
        container.write_graph(graph, WritePolicy::Fail).unwrap();
        container.save().unwrap();
    }

    #[test]
    fn oversized_header_is_refused_before_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("full.safetensors");
        export(&path, &graph_with_id("A", 1.0));
        let saved = fs::read(&path).unwrap();
        let limit = header_size(&saved);

        let mut container = Container::open(&path).unwrap();
        container
            .write_graph(&graph_with_id("B", 2.0), WritePolicy::Fail)
            .unwrap();
        let err = container.save_with_header_limit(limit).unwrap_err();
        assert!(matches!(err, ExportError::HeaderTooLarge { size, .. } if size > limit));

        assert_eq!(fs::read(&path).unwrap(), saved);
        let reopened = Container::open(&path).unwrap();
        assert_eq!(reopened.entries().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn missing_node_ids_are_reported_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.safetensors");
        let mut container = Container::open(&path).unwrap();
        container
            .write_graph(&graph_with_id("A", 1.0), WritePolicy::Fail)
            .unwrap();
        container
            .tensors
            .remove(&tensor_key("A", NODE_FEATURES, NODE_IDS));
        container.save().unwrap();

        assert!(matches!(
            Container::open(&path),
            Err(ExportError::Corrupt(key)) if key == "A/node_features/_ids"
        ));
    }
}
