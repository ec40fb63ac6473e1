use super::config::XtbConfig;
use super::descriptors::{DescriptorCalculator, DescriptorError, GlobalDescriptors};
use crate::core::io::traits::GeometryFile;
use crate::core::io::xyz::{XyzError, XyzFile};
use crate::core::models::geometry::Geometry;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace};

/// CODATA 2018 conversion factor.
pub const HARTREE_TO_EV: f64 = 27.211386245988;

const INPUT_FILE_NAME: &str = "xtbatch.xyz";

#[derive(Debug, Error)]
pub enum XtbError {
    #[error("Failed to prepare xTB scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Failed to write xTB input geometry: {0}")]
    Input(#[from] XyzError),

    #[error("Failed to start xTB '{executable}': {source}", executable = executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("xTB failed for {state} (exit code {code:?}): {stderr}")]
    Failed {
        state: ChargeState,
        code: Option<i32>,
        stderr: String,
    },

    #[error("No total energy found in xTB output for {state}")]
    EnergyNotFound { state: ChargeState },

    #[error("{state} is impossible for a molecule with nuclear charge {nuclear_charge}")]
    InvalidSpin {
        state: ChargeState,
        nuclear_charge: u32,
    },
}

/// Total charge and number of unpaired electrons of one electronic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeState {
    pub charge: i32,
    pub unpaired: u32,
}

impl ChargeState {
    /// The state reached by removing one electron, if the charge is representable.
    pub fn oxidized(self) -> Option<Self> {
        Some(Self {
            charge: self.charge.checked_add(1)?,
            unpaired: Self::ion_unpaired(self.unpaired),
        })
    }

    /// The state reached by adding one electron, if the charge is representable.
    pub fn reduced(self) -> Option<Self> {
        Some(Self {
            charge: self.charge.checked_sub(1)?,
            unpaired: Self::ion_unpaired(self.unpaired),
        })
    }

    // One electron more or less turns a closed shell into a doublet and
    // pairs up one electron of an open shell.
    fn ion_unpaired(unpaired: u32) -> u32 {
        if unpaired == 0 { 1 } else { unpaired - 1 }
    }

    fn validate(self, nuclear_charge: u32) -> Result<(), XtbError> {
        let electrons = nuclear_charge as i64 - self.charge as i64;
        let unpaired = self.unpaired as i64;
        if electrons <= 0 || unpaired > electrons || (electrons - unpaired) % 2 != 0 {
            return Err(XtbError::InvalidSpin {
                state: self,
                nuclear_charge,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ChargeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "charge {:+} with {} unpaired electron(s)",
            self.charge, self.unpaired
        )
    }
}

/// Extracts the final total energy (in Hartree) from xTB's standard output.
///
/// xTB closes a single-point run with a summary block containing a line such as
/// `| TOTAL ENERGY   -5.070544440612 Eh   |`; the last such line wins.
pub fn parse_total_energy(output: &str) -> Option<f64> {
    output
        .lines()
        .rev()
        .filter(|line| line.contains("TOTAL ENERGY"))
        .find_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let unit = tokens.iter().position(|t| *t == "Eh")?;
            tokens.get(unit.checked_sub(1)?)?.parse().ok()
        })
}

/// Computes vertical IP/EA based descriptors from three xTB single points
/// (reference state, cation, anion).
#[derive(Debug, Clone)]
pub struct XtbCalculator {
    config: XtbConfig,
}

impl XtbCalculator {
    pub fn new(config: XtbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &XtbConfig {
        &self.config
    }

    fn reference_state(&self) -> ChargeState {
        ChargeState {
            charge: self.config.charge,
            unpaired: self.config.unpaired_electrons,
        }
    }

    /// Runs one single point in a fresh scratch directory so no restart file leaks
    /// between charge states.
    pub fn total_energy(&self, geometry: &Geometry, state: ChargeState) -> Result<f64, XtbError> {
        state.validate(geometry.nuclear_charge())?;

        let scratch = tempfile::Builder::new()
            .prefix("xtbatch-")
            .tempdir()
            .map_err(XtbError::Scratch)?;
        XyzFile::write_to_path(geometry, scratch.path().join(INPUT_FILE_NAME))?;

        let mut cmd = Command::new(&self.config.executable);
        cmd.args(&self.config.launcher_args)
            .arg(INPUT_FILE_NAME)
            .arg("--gfn")
            .arg(self.config.method.gfn_level().to_string())
            .arg("--chrg")
            .arg(state.charge.to_string())
            .arg("--uhf")
            .arg(state.unpaired.to_string());
        if let Some(solvent) = &self.config.solvent {
            cmd.arg("--alpb").arg(solvent);
        }
        cmd.current_dir(scratch.path()).stdin(Stdio::null());
        debug!("Running xTB for {}: {:?}", state, cmd);

        let output = cmd.output().map_err(|e| XtbError::Spawn {
            executable: self.config.executable.clone(),
            source: e,
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("xTB output for {}:\n{}", state, stdout);

        if !output.status.success() {
            return Err(XtbError::Failed {
                state,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_total_energy(&stdout).ok_or(XtbError::EnergyNotFound { state })
    }
}

impl DescriptorCalculator for XtbCalculator {
    fn compute(&self, geometry: &Geometry) -> Result<GlobalDescriptors, DescriptorError> {
        let reference = self.reference_state();
        let invalid = || XtbError::InvalidSpin {
            state: reference,
            nuclear_charge: geometry.nuclear_charge(),
        };
        let cation = reference.oxidized().ok_or_else(invalid)?;
        let anion = reference.reduced().ok_or_else(invalid)?;

        let e_reference = self.total_energy(geometry, reference)?;
        let e_cation = self.total_energy(geometry, cation)?;
        let e_anion = self.total_energy(geometry, anion)?;

        let mut ip = (e_cation - e_reference) * HARTREE_TO_EV;
        let mut ea = (e_reference - e_anion) * HARTREE_TO_EV;
        if self.config.corrected {
            let shift = self.config.method.ipea_shift();
            ip -= shift;
            ea -= shift;
        }
        debug!(
            "{}: IP = {:.4} eV, EA = {:.4} eV (corrected: {})",
            self.config.method, ip, ea, self.config.corrected
        );

        GlobalDescriptors::from_ip_ea(ip, ea)
    }
}
