use super::settings::{GridError, GridSettings, MapMethod};
use nalgebra::Point3;
use std::collections::BTreeMap;

/// A 3-D lattice centred on a graph, holding one dense array per mapped field.
///
/// Arrays are stored x-major: the value for point `(i, j, k)` lives at
/// `(i * ny + j) * nz + k`, matching a C-ordered `[nx, ny, nz]` array.
#[derive(Debug, Clone)]
pub struct Grid {
    id: String,
    settings: GridSettings,
    method: MapMethod,
    center: Point3<f64>,
    axes: [Vec<f64>; 3],
    fields: BTreeMap<String, Vec<f64>>,
}

impl Grid {
    pub fn new(
        id: impl Into<String>,
        settings: GridSettings,
        method: MapMethod,
        center: Point3<f64>,
    ) -> Result<Self, GridError> {
        settings.validate()?;
        let resolutions = settings.resolutions();
        let axes = std::array::from_fn(|axis| {
            let start = center[axis] - settings.sizes[axis] / 2.0;
            (0..settings.points_counts[axis])
                .map(|i| start + i as f64 * resolutions[axis])
                .collect()
        });
        Ok(Self {
            id: id.into(),
            settings,
            method,
            center,
            axes,
            fields: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn method(&self) -> MapMethod {
        self.method
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Lattice coordinates along `axis` (0 = x, 1 = y, 2 = z).
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.axes[axis]
    }

    pub fn points_counts(&self) -> [usize; 3] {
        self.settings.points_counts
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [_, ny, nz] = self.settings.points_counts;
        (i * ny + j) * nz + k
    }

    pub fn field(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> &mut Vec<f64> {
        let len = self.settings.point_count();
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| vec![0.0; len])
    }

    /// Total deposited mass of a field.
    pub fn field_sum(&self, name: &str) -> Option<f64> {
        self.field(name).map(|values| values.iter().sum())
    }
}
