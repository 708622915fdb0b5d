use crate::cli::BuildArgs;
use crate::config::JobFile;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rankgraph::engine::progress::ProgressReporter;
use rankgraph::workflows::dataset::{self, DatasetReport};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: BuildArgs) -> Result<DatasetReport> {
    info!("Loading job from {:?}", &args.job);
    let base_dir = args
        .job
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let job = JobFile::from_file(&args.job)?.resolve(&base_dir, &args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Building {} graph(s) into {}...",
        job.dataset.len(),
        job.output.display()
    );
    info!("Invoking the dataset workflow...");
    let report = dataset::run(&job.dataset, &job.output, &job.options, &reporter)?;

    if !report.failed.is_empty() {
        warn!(
            "{} of {} queries failed and were skipped.",
            progress_handler.failure_count(),
            job.dataset.len()
        );
    }
    if report.written.is_empty() {
        return Err(CliError::Other(anyhow::anyhow!(
            "No graph could be built; see the errors above."
        )));
    }

    println!(
        "✓ {} graph(s) written to {}",
        report.written.len(),
        job.output.display()
    );
    for (query_id, reason) in &report.failed {
        println!("  skipped {query_id}: {reason}");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_job;
    use rankgraph::core::export::container::Container;

    fn args(job: &Path) -> BuildArgs {
        BuildArgs {
            job: job.to_path_buf(),
            output: None,
            overwrite: false,
            no_grid: false,
        }
    }

    #[test]
    fn builds_job_and_skips_failing_queries() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_job(dir.path());

        let report = run(args(&job)).unwrap();
        assert_eq!(report.written, vec!["complex:A-B", "complex:A:2:LYS->ALA"]);
        assert_eq!(report.failed.len(), 1);

        let container = Container::open(dir.path().join("graphs.rgc")).unwrap();
        assert_eq!(container.entries().count(), 2);
    }

    #[test]
    fn second_build_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_job(dir.path());
        run(args(&job)).unwrap();

        assert!(matches!(run(args(&job)), Err(CliError::Engine(_))));

        let mut overwrite = args(&job);
        overwrite.overwrite = true;
        assert_eq!(run(overwrite).unwrap().written.len(), 2);
    }
}
