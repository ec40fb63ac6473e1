use crate::config::AppConfig;
use crate::error::Result;
use tracing::info;
use xtbatch::workflows::enumerate::collect_geometry_files;

/// Number of molecules the configured dataset directories contain.
pub fn count(config: &AppConfig) -> Result<usize> {
    let files = collect_geometry_files(&config.geometry_dirs, &config.extension)?;
    info!(
        "Found {} .{} file(s) across {} director(ies).",
        files.len(),
        config.extension,
        config.geometry_dirs.len()
    );
    Ok(files.len())
}

pub fn run(config: &AppConfig) -> Result<()> {
    println!("{}", count(config)?);
    Ok(())
}
