use crate::core::export::container::{Container, WritePolicy};
use crate::core::graph::graph::Graph;
use crate::core::grid::mapping::map_graph;
use crate::core::grid::settings::{GridSettings, MapMethod};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::query::Query;
use std::path::Path;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Grid projection applied to every graph before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct GridExport {
    pub settings: GridSettings,
    pub method: MapMethod,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    pub grid: Option<GridExport>,
    pub policy: WritePolicy,
}

/// Outcome of a dataset run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetReport {
    /// Ids of the entries written to the container.
    pub written: Vec<String>,
    /// `(query id, reason)` of every query that was skipped.
    pub failed: Vec<(String, String)>,
}

impl DatasetReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An ordered collection of queries exported into one container.
#[derive(Default)]
pub struct QueryDataset {
    queries: Vec<Box<dyn Query>>,
}

impl QueryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, query: impl Query + 'static) {
        self.queries.push(Box::new(query));
    }

    pub fn add_boxed(&mut self, query: Box<dyn Query>) {
        self.queries.push(query);
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn query_ids(&self) -> Vec<String> {
        self.queries.iter().map(|q| q.query_id()).collect()
    }
}

type BuildResult = Result<Graph, EngineError>;

/// Builds every query of `dataset` and writes the graphs to the container at
/// `output`.
///
/// Queries that fail to build are reported and skipped. Container errors
/// abort the run; the file on disk is only replaced once every write has
/// succeeded.
#[instrument(skip_all, name = "dataset_workflow", fields(queries = dataset.len(), output = %output.display()))]
pub fn run(
    dataset: &QueryDataset,
    output: &Path,
    options: &ExportOptions,
    reporter: &ProgressReporter,
) -> Result<DatasetReport, EngineError> {
    info!("Building graphs for {} queries.", dataset.len());
    if let Some(grid) = &options.grid {
        grid.settings.validate()?;
    }
    let mut container = Container::open(output)?;

    reporter.report(Progress::PhaseStart {
        name: "Building Graphs",
    });
    reporter.report(Progress::TaskStart {
        total_steps: dataset.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = dataset.queries.iter();

    #[cfg(feature = "parallel")]
    let iterator = dataset.queries.par_iter();

    let results: Vec<(String, BuildResult)> = iterator
        .map(|query| {
            let result = query.build_graph();
            reporter.report(Progress::TaskIncrement);
            (query.query_id(), result)
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Exporting" });
    let mut report = DatasetReport::default();
    for (query_id, result) in results {
        let graph = match result {
            Ok(graph) => graph,
            Err(err) => {
                warn!(query = %query_id, error = %err, "Query failed, skipping");
                reporter.report(Progress::QueryFailed {
                    query_id: query_id.clone(),
                    reason: err.to_string(),
                });
                report.failed.push((query_id, err.to_string()));
                continue;
            }
        };

        container.write_graph(&graph, options.policy)?;
        if let Some(grid) = &options.grid {
            let projected = map_graph(&graph, &grid.settings, grid.method)?;
            container.write_grid(&projected, options.policy)?;
        }
        report.written.push(query_id);
    }

    container.save()?;
    reporter.report(Progress::PhaseFinish);

    info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "Dataset export complete."
    );
    Ok(report)
}
