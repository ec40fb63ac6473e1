//! # xtbatch Core Library
//!
//! Resumable, sequential extraction of xTB quantum-chemistry features over large
//! collections of molecular geometries, producing one feature row per molecule and a
//! combined dataset file.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Geometry`, `FeatureRow`,
//!   `MoleculeRecord`) and file I/O for XYZ geometries and CSV feature tables.
//!
//! - **[`engine`]: The Logic Core.** Talks to the outside world: it runs the external
//!   feature tool, computes the conceptual-DFT descriptors through xTB, and merges
//!   them into the per-molecule output. Configuration, errors and progress reporting
//!   live here too.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the layers
//!   below: enumerating the dataset, running a resumable batch, and combining the
//!   per-molecule files into one dataset.

pub mod core;
pub mod engine;
pub mod workflows;
