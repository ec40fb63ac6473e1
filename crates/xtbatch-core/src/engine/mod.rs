//! # Engine Module
//!
//! The engine performs the per-molecule work of a batch: it drives external programs,
//! turns their results into descriptors, and folds those into the feature files on
//! disk.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated settings for the external tool and xTB
//! - **External Tool** ([`invoker`]) - Runs the feature script for one molecule
//! - **Descriptors** ([`descriptors`]) - Conceptual-DFT descriptors from vertical IP/EA
//! - **xTB Backend** ([`xtb`]) - Single-point energies from the `xtb` executable
//! - **Augmentation** ([`augment`]) - Appends descriptors to a molecule's feature file
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Batch-level error types

pub mod augment;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod invoker;
pub mod progress;
pub mod xtb;
