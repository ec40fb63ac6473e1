use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::error::{CliError, Result};
use std::path::Path;
use xtbatch::engine::config::{InvokerConfigBuilder, XtbConfigBuilder, XtbMethod};

/// Resolves the application settings from the optional config file, `--set` overrides
/// and built-in defaults, in that order of precedence.
///
/// Command-line arguments of the individual subcommands are applied on top of the
/// result by the commands themselves.
pub fn build_config(config_path: Option<&Path>, set_values: &[String]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    file_config.apply_set_values(set_values)?;

    let dataset = file_config.dataset.take().unwrap_or_default();
    let external = file_config.external.take().unwrap_or_default();
    let xtb = file_config.xtb.take().unwrap_or_default();
    let output = file_config.output.take().unwrap_or_default();

    let geometry_dirs = dataset.geometry_dirs.unwrap_or(defaults.geometry_dirs);
    let extension = dataset
        .extension
        .map(|ext| ext.trim_start_matches('.').to_string())
        .unwrap_or(defaults.extension);

    let invoker = InvokerConfigBuilder::new()
        .program(external.program.unwrap_or(defaults.program))
        .args(external.args.unwrap_or(defaults.program_args))
        .working_dir(external.working_dir)
        .build()?;

    let method = match xtb.method {
        Some(name) => name.parse::<XtbMethod>()?,
        None => defaults.method,
    };
    let xtb_config = XtbConfigBuilder::new()
        .executable(xtb.executable.unwrap_or(defaults.xtb_executable))
        .launcher_args(xtb.launcher_args.unwrap_or_default())
        .method(method)
        .charge(xtb.charge.unwrap_or(defaults.charge))
        .unpaired_electrons(xtb.unpaired_electrons.unwrap_or(defaults.unpaired_electrons))
        .solvent(xtb.solvent)
        .corrected(xtb.corrected.unwrap_or(defaults.corrected))
        .build()?;

    let batch_size = output.batch_size.unwrap_or(defaults.batch_size);
    if batch_size == 0 {
        return Err(CliError::Config(
            "`output.batch-size` must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        geometry_dirs,
        extension,
        invoker,
        xtb: xtb_config,
        batch_size,
        batch_dir: output.batch_dir.unwrap_or(defaults.batch_dir),
        combined_file: output.combined_file.unwrap_or(defaults.combined_file),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_dataset_layout() {
        let config = build_config(None, &[]).unwrap();

        assert_eq!(
            config.geometry_dirs,
            vec![
                PathBuf::from("bse49/Geometries/Existing"),
                PathBuf::from("bse49/Geometries/Hypothetical"),
            ]
        );
        assert_eq!(config.extension, "xyz");
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.batch_dir, PathBuf::from("data/BSE/xtb_reps/"));
        assert_eq!(
            config.combined_file,
            PathBuf::from("data/BSE/xtb_features_combined_test.csv")
        );
        assert_eq!(config.invoker.program, PathBuf::from("bash"));
        assert_eq!(config.invoker.args, vec!["process_xtb/process_molecule.sh"]);
        assert_eq!(config.xtb.executable, PathBuf::from("xtb"));
        assert_eq!(config.xtb.method, XtbMethod::Gfn2);
        assert!(config.xtb.corrected);
    }

    #[test]
    fn file_values_replace_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xtbatch.toml");
        fs::write(
            &path,
            r#"
            [dataset]
            geometry-dirs = ["geoms"]
            extension = ".XYZ"

            [xtb]
            method = "gfn1"
            solvent = "water"

            [output]
            batch-dir = "reps"
            "#,
        )
        .unwrap();

        let config = build_config(Some(&path), &[]).unwrap();

        assert_eq!(config.geometry_dirs, vec![PathBuf::from("geoms")]);
        assert_eq!(config.extension, "XYZ");
        assert_eq!(config.xtb.method, XtbMethod::Gfn1);
        assert_eq!(config.xtb.solvent.as_deref(), Some("water"));
        assert_eq!(config.batch_dir, PathBuf::from("reps"));
        assert_eq!(config.batch_size, 50);
    }

    #[test]
    fn set_values_take_precedence_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xtbatch.toml");
        fs::write(&path, "[output]\nbatch-size = 10\n").unwrap();

        let config = build_config(Some(&path), &["output.batch-size=5".to_string()]).unwrap();
        assert_eq!(config.batch_size, 5);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(matches!(
            build_config(None, &["xtb.method=gfnff".to_string()]),
            Err(CliError::CoreConfig(_))
        ));
        assert!(matches!(
            build_config(None, &["external.program=".to_string()]),
            Err(CliError::CoreConfig(_))
        ));
        assert!(matches!(
            build_config(None, &["output.batch-size=0".to_string()]),
            Err(CliError::Config(_))
        ));
    }
}
