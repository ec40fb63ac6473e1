use crate::core::io::table::RowSet;
use crate::core::models::molecule::OUTPUT_EXTENSION;
use crate::engine::error::EngineError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineOutcome {
    /// No feature files were found; nothing was written.
    NothingToCombine,
    Combined {
        files: usize,
        rows: usize,
        columns: usize,
        output: PathBuf,
    },
}

/// Lists the feature files directly inside `input_dir`, sorted by path.
///
/// A missing directory yields an empty list. `exclude` is left out of the listing so a
/// combined file written into the same directory is not fed back into itself.
pub fn discover_feature_files(
    input_dir: &Path,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>, EngineError> {
    if !input_dir.is_dir() {
        warn!("Input directory not found: {}", input_dir.display());
        return Ok(Vec::new());
    }

    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(|e| EngineError::io(input_dir, e))? {
        let path = entry.map_err(|e| EngineError::io(input_dir, e))?.path();
        if path.extension() != Some(OsStr::new(OUTPUT_EXTENSION)) || !path.is_file() {
            continue;
        }
        if excluded.is_some() && fs::canonicalize(&path).ok() == excluded {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Concatenates every per-molecule feature file in `input_dir` into `output_file`.
///
/// Files whose headers differ are aligned on the union of their columns, in the order
/// columns are first seen; missing cells are left empty. The parent directory of
/// `output_file` is created if needed. Nothing is written when no files are found.
///
/// # Errors
///
/// Fails if a feature file cannot be read or the output cannot be written.
#[instrument(skip_all, name = "combine_workflow")]
pub fn run(input_dir: &Path, output_file: &Path) -> Result<CombineOutcome, EngineError> {
    info!("Searching for CSV files in: {}", input_dir.display());
    let files = discover_feature_files(input_dir, Some(output_file))?;

    if files.is_empty() {
        warn!(
            "No .{} files found in {}. Nothing to combine.",
            OUTPUT_EXTENSION,
            input_dir.display()
        );
        return Ok(CombineOutcome::NothingToCombine);
    }
    info!("Found {} files to combine.", files.len());

    let sets = files
        .iter()
        .map(|path| RowSet::read_from_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    let widths: Vec<usize> = sets.iter().map(|s| s.columns().len()).collect();

    let combined = RowSet::concat(sets);
    if widths.iter().any(|&w| w != combined.columns().len()) {
        warn!(
            "Feature files have differing columns; combined header has {} column(s) and missing values are left empty.",
            combined.columns().len()
        );
    }

    combined.write_to_path(output_file)?;
    info!(
        "Successfully combined {} entries into {}",
        combined.len(),
        output_file.display()
    );

    Ok(CombineOutcome::Combined {
        files: files.len(),
        rows: combined.len(),
        columns: combined.columns().len(),
        output: output_file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_directory_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("combined/all.csv");

        let outcome = run(dir.path(), &output).unwrap();

        assert_eq!(outcome, CombineOutcome::NothingToCombine);
        assert!(!output.exists());
        assert!(!dir.path().join("combined").exists());
    }

    #[test]
    fn missing_directory_writes_nothing() {
        let dir = tempdir().unwrap();
        let outcome = run(&dir.path().join("absent"), &dir.path().join("all.csv")).unwrap();
        assert_eq!(outcome, CombineOutcome::NothingToCombine);
    }

    #[test]
    fn combines_rows_under_one_header() {
        let dir = tempdir().unwrap();
        let reps = dir.path().join("reps");
        fs::create_dir(&reps).unwrap();
        fs::write(reps.join("b.csv"), "mol_name,ip\nb,9.1\n").unwrap();
        fs::write(reps.join("a.csv"), "mol_name,ip\na,8.4\n").unwrap();
        fs::write(reps.join("c.csv"), "mol_name,ip\nc,7.7\n").unwrap();
        fs::write(reps.join("notes.txt"), "not a feature file").unwrap();
        fs::create_dir(reps.join("nested")).unwrap();
        fs::write(reps.join("nested/d.csv"), "mol_name,ip\nd,1.0\n").unwrap();
        let output = dir.path().join("data/BSE/combined.csv");

        let outcome = run(&reps, &output).unwrap();

        assert_eq!(
            outcome,
            CombineOutcome::Combined {
                files: 3,
                rows: 3,
                columns: 2,
                output: output.clone(),
            }
        );
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "mol_name,ip\na,8.4\nb,9.1\nc,7.7\n"
        );
    }

    #[test]
    fn mismatched_headers_are_aligned_on_union() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "mol_name,ip,ea\na,8.4,1.2\n").unwrap();
        fs::write(dir.path().join("b.csv"), "mol_name,gap\nb,3.3\n").unwrap();
        let output = dir.path().join("out/combined.csv");

        run(dir.path(), &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "mol_name,ip,ea,gap\na,8.4,1.2,\nb,,,3.3\n"
        );
    }

    #[test]
    fn repeated_column_names_are_all_kept() {
        let dir = tempdir().unwrap();
        let reps = dir.path().join("reps");
        fs::create_dir(&reps).unwrap();
        fs::write(reps.join("a.csv"), "mol_name,x,x\na,1,2\n").unwrap();
        fs::write(reps.join("b.csv"), "mol_name,x\nb,3\n").unwrap();
        let output = dir.path().join("combined.csv");

        run(&reps, &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "mol_name,x,x.1\na,1,2\nb,3,\n"
        );
    }

    #[test]
    fn existing_output_inside_input_dir_is_not_reread() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "mol_name\na\n").unwrap();
        let output = dir.path().join("combined.csv");

        run(dir.path(), &output).unwrap();
        let second = run(dir.path(), &output).unwrap();

        assert!(matches!(second, CombineOutcome::Combined { files: 1, rows: 1, .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "mol_name\na\n");
    }

    #[test]
    fn unreadable_feature_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.csv"), "a,b\n1,2,3\n").unwrap();

        let result = run(dir.path(), &dir.path().join("out.csv"));
        assert!(matches!(result, Err(EngineError::Table(_))));
    }
}
