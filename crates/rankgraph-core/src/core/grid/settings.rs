use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Invalid grid settings: {0}")]
    InvalidSettings(String),
    #[error("Cannot project graph '{0}' without nodes")]
    EmptyGraph(String),
}

/// Kernel used to spread a feature value over the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapMethod {
    /// Whole value onto the closest lattice point.
    NearestPoint,
    /// Separable Gaussian truncated at three widths and normalized per axis.
    FastGaussian,
    /// Exact radial Gaussian over the whole lattice.
    Gaussian,
}

#[derive(Debug, Error)]
#[error("Unknown mapping method '{0}' (expected nearest-point, fast-gaussian or gaussian)")]
pub struct ParseMapMethodError(String);

impl FromStr for MapMethod {
    type Err = ParseMapMethodError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "nearest-point" | "nearest" => Ok(MapMethod::NearestPoint),
            "fast-gaussian" => Ok(MapMethod::FastGaussian),
            "gaussian" => Ok(MapMethod::Gaussian),
            _ => Err(ParseMapMethodError(s.to_string())),
        }
    }
}

impl fmt::Display for MapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MapMethod::NearestPoint => "nearest-point",
                MapMethod::FastGaussian => "fast-gaussian",
                MapMethod::Gaussian => "gaussian",
            }
        )
    }
}

/// Lattice shape: point counts and physical edge lengths (Å) per axis.
///
/// Points span `[center - size/2, center + size/2]` inclusively, so the
/// spacing along an axis is `size / (count - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GridSettings {
    pub points_counts: [usize; 3],
    pub sizes: [f64; 3],
    /// Gaussian width σ in Å; defaults to the coarsest lattice spacing.
    #[serde(default)]
    pub kernel_width: Option<f64>,
}

impl GridSettings {
    /// Same point count and size on all three axes.
    pub fn cubic(points_count: usize, size: f64) -> Self {
        Self {
            points_counts: [points_count; 3],
            sizes: [size; 3],
            kernel_width: None,
        }
    }

    pub fn with_kernel_width(mut self, sigma: f64) -> Self {
        self.kernel_width = Some(sigma);
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        for axis in 0..3 {
            if self.points_counts[axis] < 2 {
                return Err(GridError::InvalidSettings(format!(
                    "axis {axis} needs at least 2 points, got {}",
                    self.points_counts[axis]
                )));
            }
            if !(self.sizes[axis].is_finite() && self.sizes[axis] > 0.0) {
                return Err(GridError::InvalidSettings(format!(
                    "axis {axis} size must be positive, got {}",
                    self.sizes[axis]
                )));
            }
        }
        if let Some(sigma) = self.kernel_width {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(GridError::InvalidSettings(format!(
                    "kernel width must be positive, got {sigma}"
                )));
            }
        }
        Ok(())
    }

    pub fn resolutions(&self) -> [f64; 3] {
        std::array::from_fn(|axis| self.sizes[axis] / (self.points_counts[axis] - 1) as f64)
    }

    pub fn sigma(&self) -> f64 {
        self.kernel_width
            .unwrap_or_else(|| self.resolutions().into_iter().fold(0.0, f64::max))
    }

    pub fn point_count(&self) -> usize {
        self.points_counts.iter().product()
    }
}
