//! Provides input/output functionality for the files the pipeline reads and writes.
//!
//! Geometry formats implement the [`traits::GeometryFile`] trait so callers stay
//! independent of the concrete format. Feature tables are plain CSV and are handled by
//! [`table`], which also owns the all-or-nothing rewrite of per-molecule files.

pub mod table;
pub mod traits;
pub mod xyz;
