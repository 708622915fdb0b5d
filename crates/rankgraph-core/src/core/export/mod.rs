//! Persistence of graphs and grids into a keyed multi-entry container.
//!
//! Each entry is named by its graph or grid id and holds up to two
//! independently writable sections: the graph section (stacked node and edge
//! feature tensors plus the edge index) and the grid section (mapped feature
//! volumes plus the lattice axes).

pub mod container;
pub mod tensor;

use crate::core::graph::graph::Graph;
use crate::core::grid::grid::Grid;
use container::{Container, ExportError, WritePolicy};
use std::path::Path;

/// Writes one graph into the container at `path`, creating the file if needed.
pub fn export_graph(
    graph: &Graph,
    path: impl AsRef<Path>,
    policy: WritePolicy,
) -> Result<(), ExportError> {
    let mut container = Container::open(path)?;
    container.write_graph(graph, policy)?;
    container.save()
}

/// Writes one grid into the container at `path`, creating the file if needed.
pub fn export_grid(
    grid: &Grid,
    path: impl AsRef<Path>,
    policy: WritePolicy,
) -> Result<(), ExportError> {
    let mut container = Container::open(path)?;
    container.write_grid(grid, policy)?;
    container.save()
}
