use crate::cli::GenerateBatchArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::{ActiveBar, CliProgressHandler};
use tracing::{info, warn};
use xtbatch::engine::config::{BatchConfig, BatchConfigBuilder};
use xtbatch::engine::invoker::ExternalToolInvoker;
use xtbatch::engine::progress::ProgressReporter;
use xtbatch::engine::xtb::XtbCalculator;
use xtbatch::workflows::batch::{self, BatchSummary, MoleculeOutcome};
use xtbatch::workflows::enumerate::collect_geometry_files;

/// Runs one batch; a progress bar is drawn when `progress` is given.
pub fn run(
    args: GenerateBatchArgs,
    config: &AppConfig,
    progress: Option<&ActiveBar>,
) -> Result<()> {
    let batch_config = batch_config(args, config)?;

    let reporter = match progress {
        Some(active) => {
            let handler = CliProgressHandler::new();
            handler.attach(active);
            ProgressReporter::with_callback(handler.get_callback())
        }
        None => ProgressReporter::new(),
    };

    let result = execute(&batch_config, config, &reporter);
    if let Some(active) = progress {
        active.set(None);
    }
    print_summary(&result?);
    Ok(())
}

/// Merges the command-line batch parameters over the configured defaults.
fn batch_config(args: GenerateBatchArgs, config: &AppConfig) -> Result<BatchConfig> {
    let batch_size = match args.batch_size {
        Some(size) => usize::try_from(size).map_err(|_| {
            CliError::Config(format!("Batch size {} is out of range", size))
        })?,
        None => config.batch_size,
    };

    Ok(BatchConfigBuilder::new()
        .start_index(args.start_index)
        .batch_size(batch_size)
        .output_dir(args.output_dir.unwrap_or_else(|| config.batch_dir.clone()))
        .build()?)
}

fn execute(
    batch_config: &BatchConfig,
    config: &AppConfig,
    reporter: &ProgressReporter,
) -> Result<BatchSummary> {
    let files = collect_geometry_files(&config.geometry_dirs, &config.extension)?;
    if batch_config.start_index >= files.len() {
        warn!(
            "Start index {} is beyond the dataset ({} molecules); nothing to do.",
            batch_config.start_index,
            files.len()
        );
    }

    info!(
        "Using external tool {:?} and {} for descriptors.",
        config.invoker.program, config.xtb.method
    );
    let generator = ExternalToolInvoker::new(config.invoker.clone());
    let calculator = XtbCalculator::new(config.xtb.clone());

    Ok(batch::run(
        &files,
        batch_config,
        &generator,
        &calculator,
        reporter,
    )?)
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "Batch of {}: {} processed, {} skipped, {} failed.",
        summary.range,
        summary.processed(),
        summary.skipped(),
        summary.failed()
    );
    for report in &summary.reports {
        if let MoleculeOutcome::Failed(failure) = &report.outcome {
            println!("  ✗ [{}] {}: {}", report.index, report.name, failure);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::build_config;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    // Writes a one-row feature file named after the geometry; fails for "bad".
    const FEATURE_TOOL: &str = r#"
name=$(basename "$1" .xyz)
[ "$name" = "bad" ] && { echo "cannot handle $name" >&2; exit 3; }
printf 'mol_name,gap\n%s,1.5\n' "$name" > "$2"
"#;

    // Neutral -10.0 Eh, cation -9.6 Eh, anion -10.05 Eh.
    const FAKE_XTB: &str = r#"
chrg=0
for ((i = 1; i <= $#; i++)); do
  if [ "${!i}" = "--chrg" ]; then j=$((i + 1)); chrg="${!j}"; fi
done
case "$chrg" in
  0) e=-10.0 ;;
  1) e=-9.6 ;;
  -1) e=-10.05 ;;
esac
echo "          | TOTAL ENERGY              $e Eh   |"
"#;

    const WATER: &str = "3\nwater\nO 0 0 0.1173\nH 0 0.7572 -0.4692\nH 0 -0.7572 -0.4692\n";

    fn setup(names: &[&str]) -> (TempDir, AppConfig) {
        let dir = tempdir().unwrap();
        let geoms = dir.path().join("geoms");
        fs::create_dir(&geoms).unwrap();
        for name in names {
            fs::write(geoms.join(format!("{}.xyz", name)), WATER).unwrap();
        }
        let tool = dir.path().join("tool.sh");
        let xtb = dir.path().join("xtb.sh");
        fs::write(&tool, FEATURE_TOOL).unwrap();
        fs::write(&xtb, FAKE_XTB).unwrap();

        let set = |key: &str, value: &Path| format!("{}={}", key, value.display());
        let config = build_config(
            None,
            &[
                set("dataset.geometry-dirs", geoms.as_path()),
                "external.program=bash".to_string(),
                set("external.args", tool.as_path()),
                "xtb.executable=bash".to_string(),
                set("xtb.launcher-args", xtb.as_path()),
                set("output.batch-dir", dir.path().join("reps").as_path()),
            ],
        )
        .unwrap();
        (dir, config)
    }

    fn args(start_index: usize, batch_size: Option<u64>) -> GenerateBatchArgs {
        GenerateBatchArgs {
            start_index,
            batch_size,
            output_dir: None,
        }
    }

    #[test]
    fn batch_parameters_fall_back_to_config() {
        let (_dir, config) = setup(&[]);
        let batch = batch_config(args(4, None), &config).unwrap();
        assert_eq!(batch.start_index, 4);
        assert_eq!(batch.batch_size, 50);
        assert_eq!(batch.output_dir, config.batch_dir);

        let explicit = batch_config(
            GenerateBatchArgs {
                start_index: 0,
                batch_size: Some(3),
                output_dir: Some(PathBuf::from("elsewhere")),
            },
            &config,
        )
        .unwrap();
        assert_eq!(explicit.batch_size, 3);
        assert_eq!(explicit.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn processes_batch_end_to_end() {
        let (_dir, config) = setup(&["acetone", "bad", "water"]);
        let batch = batch_config(args(0, None), &config).unwrap();

        let summary = execute(&batch, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(summary.range.len(), 3);
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(!config.batch_dir.join("bad.csv").exists());

        let water = fs::read_to_string(config.batch_dir.join("water.csv")).unwrap();
        let mut lines = water.lines();
        assert_eq!(
            lines.next(),
            Some("mol_name,gap,ip,ea,electrophilicity,electrofugality,nucleofugality")
        );
        assert!(lines.next().unwrap().starts_with("water,1.5,"));
    }

    #[test]
    fn rerun_skips_finished_molecules() {
        let (_dir, config) = setup(&["acetone", "water"]);
        let batch = batch_config(args(1, Some(5)), &config).unwrap();

        execute(&batch, &config, &ProgressReporter::new()).unwrap();
        let before = fs::read_to_string(config.batch_dir.join("water.csv")).unwrap();
        let second = execute(&batch, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(second.skipped(), 1);
        assert_eq!(second.processed(), 0);
        assert!(!config.batch_dir.join("acetone.csv").exists());
        assert_eq!(
            fs::read_to_string(config.batch_dir.join("water.csv")).unwrap(),
            before
        );
    }

    #[test]
    fn start_beyond_dataset_is_not_an_error() {
        let (_dir, config) = setup(&["water"]);
        let batch = batch_config(args(10, None), &config).unwrap();

        let summary = execute(&batch, &config, &ProgressReporter::new()).unwrap();
        assert!(summary.range.is_empty());
        assert!(summary.reports.is_empty());
    }
}
