//! # Core Module
//!
//! Fundamental data structures and file formats shared by the engine and the workflows.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, geometries, molecule records and
//!   feature rows
//! - **File I/O** ([`io`]) - XYZ geometry files and CSV feature tables

pub mod io;
pub mod models;
