//! # Grid Module
//!
//! Lossy projection of a graph's node and edge features onto a regular 3-D
//! lattice for convolutional consumers.
//!
//! - [`settings`] - Lattice shape, kernel width and mapping method
//! - [`grid`] - The lattice and its per-component fields
//! - [`mapping`] - Nearest-point and Gaussian deposition kernels

pub mod grid;
pub mod mapping;
pub mod settings;
