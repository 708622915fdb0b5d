//! # Engine Module
//!
//! Graph construction on top of the [`core`](crate::core) data model.
//!
//! ## Overview
//!
//! A [`Query`](query::Query) names what to study in a structure: a
//! single-residue variant ([`VariantAtomicQuery`](query::VariantAtomicQuery),
//! atom graph) or the interface between two chains
//! ([`InterfaceResidueQuery`](query::InterfaceResidueQuery), residue graph).
//! Building a query loads the structure and its conservation tables, selects
//! the entities in scope, detects contacts ([`contacts`]), and runs the
//! feature callbacks collected in a
//! [`FeatureRegistry`](features::registry::FeatureRegistry).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Query parameters with builders and defaults
//! - **Contacts** ([`contacts`]) - Atom and residue contact detection with edge-type classification
//! - **Features** ([`features`]) - Built-in node feature callbacks and the registry
//! - **Queries** ([`query`]) - The query trait and its two implementations
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod contacts;
pub mod error;
pub mod features;
pub mod progress;
pub mod query;
