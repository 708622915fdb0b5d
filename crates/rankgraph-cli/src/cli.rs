use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "rankgraph developers",
    version,
    about = "rankgraph CLI - Builds interface and variant graphs from protein structures and exports them for deep-learning pipelines.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to build graphs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the graphs described by a job file and export them into a container.
    Build(BuildArgs),
    /// List the entries of a container, or show the contents of one entry.
    Inspect(InspectArgs),
    /// Copy selected entries of a container into another container.
    Extract(ExtractArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the job file in TOML format.
    #[arg(required = true, value_name = "JOB")]
    pub job: PathBuf,

    /// Override the output container path from the job file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Replace sections that already exist in the output container.
    #[arg(long)]
    pub overwrite: bool,

    /// Skip grid projection, even if it is defined in the job file.
    #[arg(long)]
    pub no_grid: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the container file.
    #[arg(required = true, value_name = "CONTAINER")]
    pub container: PathBuf,

    /// Show the sections, features and targets of this entry.
    #[arg(value_name = "ENTRY")]
    pub entry: Option<String>,
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path to the source container file.
    #[arg(required = true, value_name = "CONTAINER")]
    pub container: PathBuf,

    /// Path of the container receiving the entries.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Ids of the entries to copy.
    #[arg(required = true, num_args(1..), value_name = "ENTRY")]
    pub entries: Vec<String>,
}
