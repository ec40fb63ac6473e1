//! # Workflows Module
//!
//! Top-level entry points of the library. Each workflow is a complete procedure over a
//! dataset directory and reports what it did through a summary value instead of
//! printing.
//!
//! - **Enumeration** ([`enumerate`]) - Deterministic listing of the geometry files of a
//!   dataset
//! - **Batch Generation** ([`batch`]) - Resumable feature generation over an index range
//! - **Combination** ([`combine`]) - Merging per-molecule feature files into one dataset

pub mod batch;
pub mod combine;
pub mod enumerate;
