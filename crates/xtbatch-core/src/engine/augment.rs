use super::descriptors::{DescriptorCalculator, DescriptorError};
use crate::core::io::table::{self, TableError};
use crate::core::io::traits::GeometryFile;
use crate::core::io::xyz::{XyzError, XyzFile};
use crate::core::models::features::FeatureRow;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AugmentError {
    #[error("Failed to read geometry: {0}")]
    Geometry(#[from] XyzError),
    #[error("Descriptor calculation failed: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Failed to merge feature file: {0}")]
    Table(#[from] TableError),
}

/// Appends the global descriptors of a molecule to its feature file.
///
/// The geometry is read independently of whatever produced the feature file. The
/// existing header and first data row are extended with the descriptor columns and the
/// file is replaced in one step; on error the file on disk is left untouched.
pub fn augment_output(
    geometry_path: &Path,
    output_path: &Path,
    calculator: &dyn DescriptorCalculator,
) -> Result<FeatureRow, AugmentError> {
    let geometry = XyzFile::read_from_path(geometry_path)?;
    debug!(
        "Computing descriptors for {} atom(s) from {:?}",
        geometry.len(),
        geometry_path
    );
    let descriptors = calculator.compute(&geometry)?;

    let mut row = table::read_feature_row(output_path)?;
    row.extend(descriptors.named());
    table::write_feature_row(output_path, &row)?;
    Ok(row)
}
