use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileDatasetConfig {
    pub geometry_dirs: Option<Vec<PathBuf>>,
    pub extension: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileExternalConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileXtbConfig {
    pub executable: Option<PathBuf>,
    pub launcher_args: Option<Vec<String>>,
    pub method: Option<String>,
    pub charge: Option<i32>,
    pub unpaired_electrons: Option<u32>,
    pub solvent: Option<String>,
    pub corrected: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub batch_dir: Option<PathBuf>,
    pub combined_file: Option<PathBuf>,
    pub batch_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub dataset: Option<FileDatasetConfig>,
    pub external: Option<FileExternalConfig>,
    pub xtb: Option<FileXtbConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `KEY=VALUE` overrides on top of the values read from the file.
    ///
    /// List-valued keys take a comma-separated value.
    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());
            debug!("Applying override {} = {:?}", key, value);

            match key {
                "dataset.geometry-dirs" => {
                    self.dataset.get_or_insert_with(Default::default).geometry_dirs =
                        Some(split_list(value).map(PathBuf::from).collect());
                }
                "dataset.extension" => {
                    self.dataset.get_or_insert_with(Default::default).extension =
                        Some(value.to_string());
                }
                "external.program" => {
                    self.external.get_or_insert_with(Default::default).program =
                        Some(PathBuf::from(value));
                }
                "external.args" => {
                    self.external.get_or_insert_with(Default::default).args =
                        Some(split_list(value).map(String::from).collect());
                }
                "external.working-dir" => {
                    self.external.get_or_insert_with(Default::default).working_dir =
                        Some(PathBuf::from(value));
                }
                "xtb.executable" => {
                    self.xtb.get_or_insert_with(Default::default).executable =
                        Some(PathBuf::from(value));
                }
                "xtb.launcher-args" => {
                    self.xtb.get_or_insert_with(Default::default).launcher_args =
                        Some(split_list(value).map(String::from).collect());
                }
                "xtb.method" => {
                    self.xtb.get_or_insert_with(Default::default).method = Some(value.to_string());
                }
                "xtb.charge" => {
                    self.xtb.get_or_insert_with(Default::default).charge =
                        Some(parse_value(key, value, "integer")?);
                }
                "xtb.unpaired-electrons" => {
                    self.xtb.get_or_insert_with(Default::default).unpaired_electrons =
                        Some(parse_value(key, value, "non-negative integer")?);
                }
                "xtb.solvent" => {
                    self.xtb.get_or_insert_with(Default::default).solvent = Some(value.to_string());
                }
                "xtb.corrected" => {
                    self.xtb.get_or_insert_with(Default::default).corrected =
                        Some(parse_value(key, value, "boolean")?);
                }
                "output.batch-dir" => {
                    self.output.get_or_insert_with(Default::default).batch_dir =
                        Some(PathBuf::from(value));
                }
                "output.combined-file" => {
                    self.output.get_or_insert_with(Default::default).combined_file =
                        Some(PathBuf::from(value));
                }
                "output.batch-size" => {
                    self.output.get_or_insert_with(Default::default).batch_size =
                        Some(parse_value(key, value, "integer")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}
