use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use rankgraph::core::export::container::{Container, EntryManifest, StoredEntry};
use std::fmt::Write;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    if !args.container.is_file() {
        return Err(CliError::Argument(format!(
            "Container '{}' does not exist",
            args.container.display()
        )));
    }
    info!("Opening container {:?}", &args.container);
    let container = Container::open(&args.container)?;

    let text = match &args.entry {
        Some(id) => render_entry(&container.read_entry(id)?),
        None => render_listing(&container),
    };
    print!("{text}");
    Ok(())
}

fn sections(manifest: &EntryManifest) -> String {
    let mut parts = Vec::new();
    if let Some(graph) = &manifest.graph {
        parts.push(format!(
            "graph ({} {} nodes, {} edges)",
            graph.node_ids.len(),
            graph.node_kind,
            graph.edge_count
        ));
    }
    if let Some(grid) = &manifest.grid {
        let [nx, ny, nz] = grid.points_counts;
        parts.push(format!("grid ({nx}x{ny}x{nz}, {} fields)", grid.fields.len()));
    }
    parts.join(", ")
}

/// One line per entry with its sections.
pub fn render_listing(container: &Container) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} entr{}",
        container.path().display(),
        container.entries().count(),
        if container.entries().count() == 1 { "y" } else { "ies" }
    );
    for id in container.entries() {
        let summary = container.manifest(id).map(sections).unwrap_or_default();
        let _ = writeln!(out, "  {id}  {summary}");
    }
    out
}

/// Feature names, shapes, targets and grid fields of one entry.
pub fn render_entry(entry: &StoredEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", entry.id, sections(&entry.manifest));

    if let Some(graph) = &entry.manifest.graph {
        let _ = writeln!(out, "  node features:");
        for (name, shape) in &graph.node_features {
            let _ = writeln!(out, "    {name:<12} {shape}");
        }
        let _ = writeln!(out, "  edge features:");
        for (name, shape) in &graph.edge_features {
            let _ = writeln!(out, "    {name:<12} {shape}");
        }
        if !graph.targets.is_empty() {
            let _ = writeln!(out, "  targets:");
            for (name, value) in &graph.targets {
                let _ = writeln!(out, "    {name:<12} {value}");
            }
        }
    }

    if let Some(grid) = &entry.manifest.grid {
        let [cx, cy, cz] = grid.center;
        let _ = writeln!(
            out,
            "  grid: method {}, center ({cx:.3}, {cy:.3}, {cz:.3}), kernel width {:.3}",
            grid.method, grid.kernel_width
        );
        let _ = writeln!(out, "  mapped fields: {}", grid.fields.join(" "));
    }
    out
}
