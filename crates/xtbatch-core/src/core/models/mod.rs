//! # Core Models Module
//!
//! Data structures describing a molecule as it moves through the pipeline: its
//! geometry on disk, its identity within a dataset, and the feature row produced for it.
//!
//! ## Key Components
//!
//! - [`element`] - Element symbols and atomic numbers
//! - [`atom`] - A single atom with its element and Cartesian position
//! - [`geometry`] - An ordered list of atoms read from a geometry file
//! - [`molecule`] - Identity of a molecule within the dataset and its output location
//! - [`features`] - Ordered column/value pairs describing one molecule
//!
//! ## Usage
//!
//! ```ignore
//! use xtbatch::core::models::{atom::Atom, geometry::Geometry};
//! use nalgebra::Point3;
//!
//! let mut geometry = Geometry::new("water");
//! geometry.push(Atom::new("O", Point3::new(0.0, 0.0, 0.1173))?);
//! geometry.push(Atom::new("H", Point3::new(0.0, 0.7572, -0.4692))?);
//! geometry.push(Atom::new("H", Point3::new(0.0, -0.7572, -0.4692))?);
//! assert_eq!(geometry.nuclear_charge(), 10);
//! ```

pub mod atom;
pub mod element;
pub mod features;
pub mod geometry;
pub mod molecule;
