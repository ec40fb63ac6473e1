use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// How to run the external per-molecule feature tool.
///
/// The tool is started as `program [args...] <geometry> <output>`. With a
/// `working_dir`, both paths are passed in absolute form.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Default)]
pub struct InvokerConfigBuilder {
    program: Option<PathBuf>,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl InvokerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn build(self) -> Result<InvokerConfig, ConfigError> {
        let program = self
            .program
            .ok_or(ConfigError::MissingParameter("program"))?;
        if program.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "program",
                reason: "must not be empty".into(),
            });
        }
        Ok(InvokerConfig {
            program,
            args: self.args,
            working_dir: self.working_dir,
        })
    }
}

/// The GFN-xTB parameterization used for descriptor calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XtbMethod {
    Gfn1,
    #[default]
    Gfn2,
}

impl XtbMethod {
    /// Value passed to `xtb --gfn`.
    pub fn gfn_level(self) -> u8 {
        match self {
            XtbMethod::Gfn1 => 1,
            XtbMethod::Gfn2 => 2,
        }
    }

    /// Empirical shift in eV subtracted from vertical IPs and EAs in corrected mode.
    pub fn ipea_shift(self) -> f64 {
        match self {
            XtbMethod::Gfn1 => 5.700,
            XtbMethod::Gfn2 => 4.846,
        }
    }
}

impl FromStr for XtbMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "gfn1" | "gfn1-xtb" => Ok(XtbMethod::Gfn1),
            "2" | "gfn2" | "gfn2-xtb" => Ok(XtbMethod::Gfn2),
            other => Err(ConfigError::InvalidParameter {
                parameter: "method",
                reason: format!("unknown xTB method '{}', expected 'gfn1' or 'gfn2'", other),
            }),
        }
    }
}

impl fmt::Display for XtbMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GFN{}-xTB", self.gfn_level())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XtbConfig {
    pub executable: PathBuf,
    /// Leading arguments placed before the xTB options, for wrappers such as
    /// container runtimes.
    pub launcher_args: Vec<String>,
    pub method: XtbMethod,
    /// Total charge of the reference (neutral) state.
    pub charge: i32,
    /// Number of unpaired electrons of the reference state.
    pub unpaired_electrons: u32,
    /// Implicit solvent for the ALPB model, if any.
    pub solvent: Option<String>,
    /// Apply the empirical IP/EA shift of the method.
    pub corrected: bool,
}

#[derive(Default)]
pub struct XtbConfigBuilder {
    executable: Option<PathBuf>,
    launcher_args: Vec<String>,
    method: Option<XtbMethod>,
    charge: Option<i32>,
    unpaired_electrons: Option<u32>,
    solvent: Option<String>,
    corrected: Option<bool>,
}

impl XtbConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }
    pub fn launcher_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.launcher_args.extend(args.into_iter().map(Into::into));
        self
    }
    pub fn method(mut self, method: XtbMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }
    pub fn unpaired_electrons(mut self, n: u32) -> Self {
        self.unpaired_electrons = Some(n);
        self
    }
    pub fn solvent(mut self, solvent: Option<String>) -> Self {
        self.solvent = solvent;
        self
    }
    pub fn corrected(mut self, corrected: bool) -> Self {
        self.corrected = Some(corrected);
        self
    }

    /// Builds the configuration. Only the executable is required; the remaining
    /// parameters default to a neutral closed-shell GFN2 calculation in the gas phase
    /// with corrected IP/EA.
    pub fn build(self) -> Result<XtbConfig, ConfigError> {
        let solvent = match self.solvent {
            Some(s) if s.trim().is_empty() => None,
            other => other,
        };
        Ok(XtbConfig {
            executable: self
                .executable
                .ok_or(ConfigError::MissingParameter("executable"))?,
            launcher_args: self.launcher_args,
            method: self.method.unwrap_or_default(),
            charge: self.charge.unwrap_or(0),
            unpaired_electrons: self.unpaired_electrons.unwrap_or(0),
            solvent,
            corrected: self.corrected.unwrap_or(true),
        })
    }
}

/// Parameters of one `generate-batch` run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub start_index: usize,
    pub batch_size: usize,
    pub output_dir: PathBuf,
}

#[derive(Default)]
pub struct BatchConfigBuilder {
    start_index: Option<usize>,
    batch_size: Option<usize>,
    output_dir: Option<PathBuf>,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_index(mut self, index: usize) -> Self {
        self.start_index = Some(index);
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<BatchConfig, ConfigError> {
        Ok(BatchConfig {
            start_index: self
                .start_index
                .ok_or(ConfigError::MissingParameter("start_index"))?,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
        })
    }
}
