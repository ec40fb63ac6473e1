use super::config::InvokerConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Failed to start '{program}': {source}", program = program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool failed for '{geometry}' with {status}", geometry = geometry.display(), status = describe_exit(*code))]
    NonZeroExit {
        geometry: PathBuf,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Cannot resolve path '{path}': {source}", path = path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool exited successfully but did not write '{path}'", path = path.display())]
    MissingOutput { path: PathBuf },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

/// Produces the first segment of a molecule's feature row.
///
/// On success, `output_path` holds a CSV with a header and one data row whose first
/// column identifies the molecule.
pub trait FeatureGenerator {
    fn generate(&self, geometry_path: &Path, output_path: &Path) -> Result<(), InvokeError>;
}

/// Runs an external program once per molecule and waits for it to exit.
///
/// There is no timeout: a program that never exits blocks the batch.
#[derive(Debug, Clone)]
pub struct ExternalToolInvoker {
    config: InvokerConfig,
}

impl ExternalToolInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    fn command(&self, geometry_path: &Path, output_path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(geometry_path)
            .arg(output_path)
            .stdin(Stdio::null());
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Paths handed to a tool running in another directory must not be relative to ours.
fn resolve(path: &Path, working_dir: Option<&Path>) -> Result<PathBuf, InvokeError> {
    match working_dir {
        Some(_) => std::path::absolute(path).map_err(|e| InvokeError::Path {
            path: path.to_path_buf(),
            source: e,
        }),
        None => Ok(path.to_path_buf()),
    }
}

impl FeatureGenerator for ExternalToolInvoker {
    fn generate(&self, geometry_path: &Path, output_path: &Path) -> Result<(), InvokeError> {
        let working_dir = self.config.working_dir.as_deref();
        let geometry_arg = resolve(geometry_path, working_dir)?;
        let output_arg = resolve(output_path, working_dir)?;
        let mut cmd = self.command(&geometry_arg, &output_arg);
        debug!("Running external tool: {:?}", cmd);

        let output = cmd.output().map_err(|e| InvokeError::Spawn {
            program: self.config.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(InvokeError::NonZeroExit {
                geometry: geometry_path.to_path_buf(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        if !output_arg.is_file() {
            return Err(InvokeError::MissingOutput {
                path: output_path.to_path_buf(),
            });
        }

        Ok(())
    }
}
