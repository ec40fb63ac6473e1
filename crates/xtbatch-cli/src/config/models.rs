use std::path::PathBuf;
use xtbatch::engine::config::{InvokerConfig, XtbConfig};

/// Fully resolved settings shared by all subcommands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub geometry_dirs: Vec<PathBuf>,
    pub extension: String,
    pub invoker: InvokerConfig,
    pub xtb: XtbConfig,
    pub batch_size: usize,
    pub batch_dir: PathBuf,
    pub combined_file: PathBuf,
}
