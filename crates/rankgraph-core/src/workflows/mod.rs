//! # Workflows Module
//!
//! High-level entry points that run complete graph-generation jobs.
//!
//! ## Overview
//!
//! A workflow takes a set of queries, builds their graphs through the
//! [`engine`](crate::engine), optionally projects them onto grids, and
//! persists everything into a single container. Individual query failures
//! are reported and skipped; container failures abort the run without
//! touching the file on disk.
//!
//! ## Architecture
//!
//! - **Dataset Workflow** ([`dataset`]) - Builds many queries (in parallel with
//!   the `parallel` feature) and exports the graphs into one container.

pub mod dataset;
