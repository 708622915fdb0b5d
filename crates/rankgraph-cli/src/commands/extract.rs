use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use rankgraph::core::export::container::Container;
use tracing::info;

pub fn run(args: ExtractArgs) -> Result<()> {
    if !args.container.is_file() {
        return Err(CliError::Argument(format!(
            "Container '{}' does not exist",
            args.container.display()
        )));
    }
    if args.container == args.output {
        return Err(CliError::Argument(
            "Source and destination containers must differ".to_string(),
        ));
    }

    let source = Container::open(&args.container)?;
    let ids: Vec<&str> = args.entries.iter().map(String::as_str).collect();
    info!(
        "Copying {} entr(ies) from {:?} to {:?}",
        ids.len(),
        &args.container,
        &args.output
    );
    let subset = source.extract(&ids, &args.output)?;
    subset.save()?;

    println!(
        "✓ {} entr(ies) copied to {}",
        ids.len(),
        args.output.display()
    );
    Ok(())
}
