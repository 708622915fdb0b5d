use super::grid::Grid;
use super::settings::{GridError, GridSettings, MapMethod};
use crate::core::graph::feature::FeatureValue;
use crate::core::graph::graph::{FeatureMap, Graph};
use nalgebra::Point3;
use std::f64::consts::PI;
use tracing::{debug, instrument};

/// Window half-width of the fast Gaussian kernel, in kernel widths.
const FAST_GAUSSIAN_CUTOFF: f64 = 3.0;

/// Name of the mapped field holding component `index` of `feature`.
pub fn mapped_field_name(feature: &str, index: usize) -> String {
    format!("{feature}_{index:03}")
}

/// Projects every node and edge feature of `graph` onto a lattice centred on
/// the mean node position.
///
/// Edge values are deposited at both endpoint positions. Vector features are
/// mapped component-wise into fields named by [`mapped_field_name`].
#[instrument(skip_all, name = "grid_projection", fields(graph = graph.id(), method = %method))]
pub fn map_graph(
    graph: &Graph,
    settings: &GridSettings,
    method: MapMethod,
) -> Result<Grid, GridError> {
    let center = graph
        .centroid()
        .ok_or_else(|| GridError::EmptyGraph(graph.id().to_string()))?;
    let mut grid = Grid::new(graph.id(), settings.clone(), method, center)?;

    for edge in graph.edges() {
        map_features(&mut grid, edge.position1(), &edge.features);
        map_features(&mut grid, edge.position2(), &edge.features);
    }
    for node in graph.nodes() {
        map_features(&mut grid, node.position(), &node.features);
    }

    debug!(fields = grid.field_count(), "Mapped graph features onto grid");
    Ok(grid)
}

/// Deposits every feature of one node or edge endpoint at `position`.
///
/// Kernel weights are computed once per position and shared by all features.
pub fn map_features(grid: &mut Grid, position: Point3<f64>, features: &FeatureMap) {
    if features.is_empty() {
        return;
    }
    let weights = kernel_weights(grid, position);
    for (name, value) in features {
        deposit(grid, &weights, name, value);
    }
}

fn deposit(grid: &mut Grid, weights: &[(usize, f64)], feature: &str, value: &FeatureValue) {
    for (index, &component) in value.components().iter().enumerate() {
        let field = grid.field_mut(&mapped_field_name(feature, index));
        for &(point, weight) in weights {
            field[point] += component * weight;
        }
    }
}

fn kernel_weights(grid: &Grid, position: Point3<f64>) -> Vec<(usize, f64)> {
    match grid.method() {
        MapMethod::NearestPoint => {
            let [i, j, k] = std::array::from_fn(|axis| nearest_index(grid.axis(axis), position[axis]));
            vec![(grid.index(i, j, k), 1.0)]
        }
        MapMethod::FastGaussian => fast_gaussian_weights(grid, position),
        MapMethod::Gaussian => gaussian_weights(grid, position),
    }
}

fn nearest_index(axis: &[f64], x: f64) -> usize {
    let (first, last) = (axis[0], axis[axis.len() - 1]);
    let step = (last - first) / (axis.len() - 1) as f64;
    let raw = ((x - first) / step).round();
    raw.clamp(0.0, (axis.len() - 1) as f64) as usize
}

/// Per-axis Gaussian weights within the cutoff window, normalized to sum to 1.
///
/// A source farther than the window from every lattice point on an axis
/// falls back to the nearest point, so no mass is dropped.
fn axis_weights(axis: &[f64], x: f64, sigma: f64) -> Vec<(usize, f64)> {
    let reach = FAST_GAUSSIAN_CUTOFF * sigma;
    let mut weights: Vec<(usize, f64)> = axis
        .iter()
        .enumerate()
        .filter(|(_, coord)| (**coord - x).abs() <= reach)
        .map(|(i, &coord)| (i, (-(coord - x).powi(2) / (2.0 * sigma * sigma)).exp()))
        .collect();
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if weights.is_empty() || total <= 0.0 {
        return vec![(nearest_index(axis, x), 1.0)];
    }
    for (_, w) in &mut weights {
        *w /= total;
    }
    weights
}

fn fast_gaussian_weights(grid: &Grid, position: Point3<f64>) -> Vec<(usize, f64)> {
    let sigma = grid.settings().sigma();
    let [wx, wy, wz]: [Vec<(usize, f64)>; 3] =
        std::array::from_fn(|axis| axis_weights(grid.axis(axis), position[axis], sigma));

    let mut weights = Vec::with_capacity(wx.len() * wy.len() * wz.len());
    for &(i, a) in &wx {
        for &(j, b) in &wy {
            for &(k, c) in &wz {
                weights.push((grid.index(i, j, k), a * b * c));
            }
        }
    }
    weights
}

fn gaussian_weights(grid: &Grid, position: Point3<f64>) -> Vec<(usize, f64)> {
    let sigma = grid.settings().sigma();
    let [rx, ry, rz] = grid.settings().resolutions();
    let norm = rx * ry * rz / ((2.0 * PI).powf(1.5) * sigma.powi(3));
    let two_sigma_sq = 2.0 * sigma * sigma;

    let [nx, ny, nz] = grid.points_counts();
    let mut weights = Vec::with_capacity(nx * ny * nz);
    for (i, &x) in grid.axis(0).iter().enumerate() {
        let dx2 = (x - position.x).powi(2);
        for (j, &y) in grid.axis(1).iter().enumerate() {
            let dxy2 = dx2 + (y - position.y).powi(2);
            for (k, &z) in grid.axis(2).iter().enumerate() {
                let d2 = dxy2 + (z - position.z).powi(2);
                weights.push((grid.index(i, j, k), norm * (-d2 / two_sigma_sq).exp()));
            }
        }
    }
    weights
}
