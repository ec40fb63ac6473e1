//! Global conceptual-DFT reactivity descriptors.
//!
//! All descriptors derive from the vertical ionization potential (IP) and electron
//! affinity (EA) of a molecule:
//!
//! | column             | definition                         |
//! |--------------------|------------------------------------|
//! | `ip`               | E(N-1) - E(N)                      |
//! | `ea`               | E(N) - E(N+1)                      |
//! | `electrophilicity` | (IP + EA)² / 8(IP - EA)            |
//! | `electrofugality`  | (3 IP - EA)² / 8(IP - EA)          |
//! | `nucleofugality`   | (IP - 3 EA)² / 8(IP - EA)          |
//!
//! Energies are in eV. In corrected mode the empirical shift of the xTB method is
//! subtracted from both IP and EA before the derived descriptors are evaluated.

use super::xtb::XtbError;
use crate::core::models::geometry::Geometry;
use thiserror::Error;

/// Names of the appended columns, in the order they are written.
pub const DESCRIPTOR_COLUMNS: [&str; 5] = [
    "ip",
    "ea",
    "electrophilicity",
    "electrofugality",
    "nucleofugality",
];

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Descriptors are undefined for IP = EA = {value} eV")]
    Degenerate { value: f64 },

    #[error("Non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    #[error(transparent)]
    Backend(#[from] XtbError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalDescriptors {
    pub ip: f64,
    pub ea: f64,
    pub electrophilicity: f64,
    pub electrofugality: f64,
    pub nucleofugality: f64,
}

impl GlobalDescriptors {
    /// Derives the full descriptor set from an IP/EA pair.
    pub fn from_ip_ea(ip: f64, ea: f64) -> Result<Self, DescriptorError> {
        for (quantity, value) in [("ionization potential", ip), ("electron affinity", ea)] {
            if !value.is_finite() {
                return Err(DescriptorError::NonFinite { quantity, value });
            }
        }

        let hardness = 8.0 * (ip - ea);
        if hardness == 0.0 {
            return Err(DescriptorError::Degenerate { value: ip });
        }

        Ok(Self {
            ip,
            ea,
            electrophilicity: (ip + ea).powi(2) / hardness,
            electrofugality: (3.0 * ip - ea).powi(2) / hardness,
            nucleofugality: (ip - 3.0 * ea).powi(2) / hardness,
        })
    }

    /// Values in the order of [`DESCRIPTOR_COLUMNS`].
    pub fn values(&self) -> [f64; 5] {
        [
            self.ip,
            self.ea,
            self.electrophilicity,
            self.electrofugality,
            self.nucleofugality,
        ]
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        DESCRIPTOR_COLUMNS.into_iter().zip(self.values())
    }
}

/// Computes the global descriptors of one molecule.
pub trait DescriptorCalculator {
    fn compute(&self, geometry: &Geometry) -> Result<GlobalDescriptors, DescriptorError>;
}
