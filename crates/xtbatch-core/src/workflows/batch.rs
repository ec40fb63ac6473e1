use crate::core::models::molecule::MoleculeRecord;
use crate::engine::augment::{AugmentError, augment_output};
use crate::engine::config::BatchConfig;
use crate::engine::descriptors::DescriptorCalculator;
use crate::engine::error::EngineError;
use crate::engine::invoker::{FeatureGenerator, InvokeError};
use crate::engine::progress::{Progress, ProgressReporter};
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// A contiguous slice `[start, end)` of the sorted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl BatchRange {
    /// Clamps `start + batch_size` to the dataset size. A start at or beyond the end of
    /// the dataset gives an empty range.
    pub fn new(start: usize, batch_size: usize, total: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(batch_size).min(total),
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end.max(self.start)
    }
}

impl fmt::Display for BatchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "no molecules from {} out of {}", self.start, self.total)
        } else {
            write!(
                f,
                "molecules {} to {} out of {}",
                self.start,
                self.end - 1,
                self.total
            )
        }
    }
}

/// The step that failed for a molecule.
#[derive(Debug)]
pub enum MoleculeFailure {
    ExternalTool(InvokeError),
    Augmentation(AugmentError),
}

impl fmt::Display for MoleculeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeFailure::ExternalTool(e) => write!(f, "{}", e),
            MoleculeFailure::Augmentation(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub enum MoleculeOutcome {
    /// An output file already existed.
    Skipped,
    Processed,
    Failed(MoleculeFailure),
}

#[derive(Debug)]
pub struct MoleculeReport {
    pub index: usize,
    pub name: String,
    pub output_path: PathBuf,
    pub outcome: MoleculeOutcome,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub range: BatchRange,
    pub reports: Vec<MoleculeReport>,
}

impl BatchSummary {
    fn count(&self, predicate: impl Fn(&MoleculeOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, MoleculeOutcome::Processed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MoleculeOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MoleculeOutcome::Failed(_)))
    }
}

/// Generates features for the molecules `[start, start + batch_size)` of `files`.
///
/// Molecules are handled one at a time. A molecule whose output file already exists is
/// skipped, so re-running a batch only retries what is missing. A failure in either
/// step removes the molecule's output file and moves on to the next molecule; it
/// never aborts the batch.
///
/// # Errors
///
/// Only fails if the output directory cannot be created.
#[instrument(skip_all, name = "batch_workflow")]
pub fn run(
    files: &[PathBuf],
    config: &BatchConfig,
    generator: &dyn FeatureGenerator,
    calculator: &dyn DescriptorCalculator,
    reporter: &ProgressReporter,
) -> Result<BatchSummary, EngineError> {
    let range = BatchRange::new(config.start_index, config.batch_size, files.len());
    info!("Processing {}", range);

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| EngineError::io(&config.output_dir, e))?;

    reporter.report(Progress::PhaseStart {
        name: "Generating features",
    });
    reporter.report(Progress::TaskStart {
        total_steps: range.len() as u64,
    });

    let mut reports = Vec::with_capacity(range.len());
    for index in range.indices() {
        let record = MoleculeRecord::from_path(&files[index]);
        let output_path = record.output_path(&config.output_dir);
        reporter.report(Progress::StatusUpdate {
            text: record.name.clone(),
        });

        let outcome = process_molecule(
            index,
            &range,
            &record,
            &output_path,
            generator,
            calculator,
        );
        if let MoleculeOutcome::Failed(failure) = &outcome {
            reporter.report(Progress::Message(format!(
                "✗ {}: {}",
                record.name, failure
            )));
        }

        reports.push(MoleculeReport {
            index,
            name: record.name,
            output_path,
            outcome,
        });
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let summary = BatchSummary { range, reports };
    info!(
        "Batch finished: {} processed, {} skipped, {} failed.",
        summary.processed(),
        summary.skipped(),
        summary.failed()
    );
    Ok(summary)
}

fn process_molecule(
    index: usize,
    range: &BatchRange,
    record: &MoleculeRecord,
    output_path: &Path,
    generator: &dyn FeatureGenerator,
    calculator: &dyn DescriptorCalculator,
) -> MoleculeOutcome {
    let position = format!("[{}/{}]", index, range.total);

    if output_path.exists() {
        info!(
            "{} Skipping already processed molecule: {}",
            position, record.name
        );
        return MoleculeOutcome::Skipped;
    }

    info!("{} Running external tool for {}...", position, record.name);
    if let Err(e) = generator.generate(&record.geometry_path, output_path) {
        error!("{} {}", position, e);
        if let InvokeError::NonZeroExit { stdout, stderr, .. } = &e {
            error!("--- EXTERNAL TOOL STDOUT ---\n{}", stdout);
            error!("--- EXTERNAL TOOL STDERR ---\n{}", stderr);
        }
        remove_output(output_path);
        return MoleculeOutcome::Failed(MoleculeFailure::ExternalTool(e));
    }

    if let Err(e) = augment_output(&record.geometry_path, output_path, calculator) {
        error!(
            "{} Descriptor calculation or merge failed for {}: {}",
            position,
            record.geometry_path.display(),
            e
        );
        remove_output(output_path);
        return MoleculeOutcome::Failed(MoleculeFailure::Augmentation(e));
    }

    info!(
        "{} Successfully combined features for: {}",
        position, record.name
    );
    MoleculeOutcome::Processed
}

/// Deletes a failed molecule's output so the next run retries it from scratch.
fn remove_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("Removed incomplete output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Could not remove incomplete output {}: {}. It must be deleted by hand before a retry.",
            path.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::geometry::Geometry;
    use crate::engine::config::BatchConfigBuilder;
    use crate::engine::descriptors::{DescriptorError, GlobalDescriptors};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use tempfile::{TempDir, tempdir};

    const GEOMETRY: &str = "2\nhydrogen\nH 0 0 0\nH 0 0 0.74\n";

    /// Writes `mol_name,energy` rows and fails for the listed molecules.
    #[derive(Default)]
    struct MockGenerator {
        calls: RefCell<Vec<String>>,
        fail_for: HashSet<String>,
        partial_write_on_failure: bool,
    }

    impl FeatureGenerator for MockGenerator {
        fn generate(&self, geometry_path: &Path, output_path: &Path) -> Result<(), InvokeError> {
            let name = geometry_path.file_stem().unwrap().to_string_lossy().into_owned();
            self.calls.borrow_mut().push(name.clone());

            if self.fail_for.contains(&name) {
                if self.partial_write_on_failure {
                    fs::write(output_path, "mol_name,ener").unwrap();
                }
                return Err(InvokeError::NonZeroExit {
                    geometry: geometry_path.to_path_buf(),
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "xtb crashed".into(),
                });
            }

            fs::write(output_path, format!("mol_name,energy\n{},-1.5\n", name)).unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockCalculator {
        calls: RefCell<usize>,
        fail: bool,
    }

    impl DescriptorCalculator for MockCalculator {
        fn compute(&self, _: &Geometry) -> Result<GlobalDescriptors, DescriptorError> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                return Err(DescriptorError::Degenerate { value: 0.0 });
            }
            GlobalDescriptors::from_ip_ea(10.0, 2.0)
        }
    }

    fn dataset(n: usize) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let geoms = dir.path().join("geoms");
        fs::create_dir(&geoms).unwrap();
        let files = (0..n)
            .map(|i| {
                let path = geoms.join(format!("mol{:03}.xyz", i));
                fs::write(&path, GEOMETRY).unwrap();
                path
            })
            .collect();
        (dir, files)
    }

    fn config(dir: &TempDir, start: usize, size: usize) -> BatchConfig {
        BatchConfigBuilder::new()
            .start_index(start)
            .batch_size(size)
            .output_dir(dir.path().join("out/reps"))
            .build()
            .unwrap()
    }

    #[test]
    fn range_is_clamped_to_dataset_size() {
        let range = BatchRange::new(100, 50, 120);
        assert_eq!(range.end, 120);
        assert_eq!(range.len(), 20);
        assert_eq!(range.indices(), 100..120);
    }

    #[test]
    fn range_past_the_end_is_empty() {
        let range = BatchRange::new(200, 50, 120);
        assert!(range.is_empty());
        assert_eq!(range.indices().count(), 0);
        assert!(BatchRange::new(0, 50, 0).is_empty());
        assert_eq!(BatchRange::new(usize::MAX, 50, 10).len(), 0);
    }

    #[test]
    fn range_displays_inclusive_bounds() {
        assert_eq!(
            BatchRange::new(100, 50, 120).to_string(),
            "molecules 100 to 119 out of 120"
        );
        assert_eq!(
            BatchRange::new(0, 50, 0).to_string(),
            "no molecules from 0 out of 0"
        );
        assert_eq!(
            BatchRange::new(usize::MAX, 50, 10).to_string(),
            format!("no molecules from {} out of 10", usize::MAX)
        );
    }

    #[test]
    fn processes_only_the_clamped_range() {
        let (dir, files) = dataset(120);
        let generator = MockGenerator::default();
        let calculator = MockCalculator::default();

        let summary = run(
            &files,
            &config(&dir, 100, 50),
            &generator,
            &calculator,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.processed(), 20);
        assert_eq!(summary.reports.first().unwrap().index, 100);
        assert_eq!(summary.reports.last().unwrap().index, 119);
        assert_eq!(generator.calls.borrow().len(), 20);
        assert_eq!(*calculator.calls.borrow(), 20);
        let written = fs::read_dir(dir.path().join("out/reps")).unwrap().count();
        assert_eq!(written, 20);
    }

    #[test]
    fn start_beyond_dataset_processes_nothing() {
        let (dir, files) = dataset(3);
        let generator = MockGenerator::default();

        let summary = run(
            &files,
            &config(&dir, 10, 50),
            &generator,
            &MockCalculator::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(summary.reports.is_empty());
        assert!(generator.calls.borrow().is_empty());
        assert!(dir.path().join("out/reps").is_dir());
    }

    #[test]
    fn second_run_skips_everything_and_keeps_files() {
        let (dir, files) = dataset(4);
        let cfg = config(&dir, 0, 50);

        let first_generator = MockGenerator::default();
        let first_calculator = MockCalculator::default();
        let first = run(
            &files,
            &cfg,
            &first_generator,
            &first_calculator,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(first.processed(), 4);
        let snapshot = fs::read_to_string(cfg.output_dir.join("mol002.csv")).unwrap();

        let second_generator = MockGenerator::default();
        let second_calculator = MockCalculator::default();
        let second = run(
            &files,
            &cfg,
            &second_generator,
            &second_calculator,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(second.skipped(), 4);
        assert_eq!(second.processed(), 0);
        assert!(second_generator.calls.borrow().is_empty());
        assert_eq!(*second_calculator.calls.borrow(), 0);
        assert_eq!(
            fs::read_to_string(cfg.output_dir.join("mol002.csv")).unwrap(),
            snapshot
        );
        assert_eq!(
            snapshot,
            "mol_name,energy,ip,ea,electrophilicity,electrofugality,nucleofugality\n\
             mol002,-1.5,10,2,2.25,12.25,0.25\n"
        );
    }

    #[test]
    fn tool_failure_is_isolated_and_leaves_no_output() {
        let (dir, files) = dataset(3);
        let cfg = config(&dir, 0, 3);
        let generator = MockGenerator {
            fail_for: HashSet::from(["mol001".to_string()]),
            partial_write_on_failure: true,
            ..Default::default()
        };
        let calculator = MockCalculator::default();

        let summary = run(
            &files,
            &cfg,
            &generator,
            &calculator,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            summary.reports[1].outcome,
            MoleculeOutcome::Failed(MoleculeFailure::ExternalTool(_))
        ));
        assert!(!cfg.output_dir.join("mol001.csv").exists());
        assert!(cfg.output_dir.join("mol002.csv").exists());
        assert_eq!(*calculator.calls.borrow(), 2);
    }

    #[test]
    fn augmentation_failure_removes_tool_output() {
        let (dir, files) = dataset(2);
        let cfg = config(&dir, 0, 2);
        let calculator = MockCalculator {
            fail: true,
            ..Default::default()
        };

        let summary = run(
            &files,
            &cfg,
            &MockGenerator::default(),
            &calculator,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.failed(), 2);
        assert!(summary.reports.iter().all(|r| matches!(
            r.outcome,
            MoleculeOutcome::Failed(MoleculeFailure::Augmentation(_))
        )));
        assert_eq!(fs::read_dir(&cfg.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn failed_molecule_is_retried_on_next_run() {
        let (dir, files) = dataset(2);
        let cfg = config(&dir, 0, 2);
        let failing = MockGenerator {
            fail_for: HashSet::from(["mol000".to_string()]),
            ..Default::default()
        };
        run(
            &files,
            &cfg,
            &failing,
            &MockCalculator::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let retry = MockGenerator::default();
        let summary = run(
            &files,
            &cfg,
            &retry,
            &MockCalculator::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(*retry.calls.borrow(), vec!["mol000".to_string()]);
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn reports_progress_for_every_molecule() {
        use std::sync::Mutex;

        let (dir, files) = dataset(3);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            events.lock().unwrap().push(p);
        }));

        run(
            &files,
            &config(&dir, 1, 5),
            &MockGenerator::default(),
            &MockCalculator::default(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(events.contains(&Progress::TaskStart { total_steps: 2 }));
        let increments = events
            .iter()
            .filter(|e| **e == Progress::TaskIncrement)
            .count();
        assert_eq!(increments, 2);
        assert_eq!(events.last(), Some(&Progress::PhaseFinish));
    }

    #[test]
    fn unwritable_output_directory_is_an_error() {
        let (dir, files) = dataset(1);
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let cfg = BatchConfigBuilder::new()
            .start_index(0)
            .output_dir(blocker.join("reps"))
            .build()
            .unwrap();

        let result = run(
            &files,
            &cfg,
            &MockGenerator::default(),
            &MockCalculator::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}
