use crate::core::models::features::FeatureRow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}", path = path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("'{path}' has no header row", path = path.display())]
    MissingHeader { path: PathBuf },
    #[error("'{path}' has a header but no data row", path = path.display())]
    MissingDataRow { path: PathBuf },
}

impl TableError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads the header and the first data row of a per-molecule feature file.
///
/// Rows after the first are ignored. A data row whose length differs from the header
/// is reported as a CSV error.
pub fn read_feature_row(path: &Path) -> Result<FeatureRow, TableError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::csv(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| TableError::csv(path, e))?
        .iter()
        .map(String::from)
        .collect();
    if columns.is_empty() {
        return Err(TableError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let record = match reader.records().next() {
        Some(record) => record.map_err(|e| TableError::csv(path, e))?,
        None => {
            return Err(TableError::MissingDataRow {
                path: path.to_path_buf(),
            });
        }
    };
    let values = record.iter().map(String::from).collect();

    // The reader is strict about record lengths, so the shapes always agree here.
    FeatureRow::new(columns, values).map_err(|e| {
        TableError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        )
    })
}

/// Replaces `path` with a two-line CSV holding `row`.
///
/// The content is written to a temporary file in the same directory and renamed over
/// the target, so readers see either the old file or the complete new one.
pub fn write_feature_row(path: &Path, row: &FeatureRow) -> Result<(), TableError> {
    let dir = parent_dir(path);
    let temp = tempfile::Builder::new()
        .prefix(".xtbatch-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| TableError::io(path, e))?;

    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        writer
            .write_record(row.columns())
            .map_err(|e| TableError::csv(path, e))?;
        writer
            .write_record(row.values())
            .map_err(|e| TableError::csv(path, e))?;
        writer.flush().map_err(|e| TableError::io(path, e))?;
    }

    // The temp file starts out owner-only; keep whatever mode the target had.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| TableError::io(path, e))?;
    }

    temp.persist(path).map_err(|e| TableError::io(path, e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// A set of rows sharing one header, as loaded from or written to a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RowSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Loads every row of a CSV file with a header.
    ///
    /// Repeated column names are made unique by suffixing `.1`, `.2`, ... to the later
    /// occurrences, so no column is lost when sets are concatenated.
    pub fn read_from_path(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::csv(path, e))?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|e| TableError::csv(path, e))?
            .iter()
            .map(String::from)
            .collect();
        let columns = dedup_columns(&header);
        if columns != header {
            warn!(
                "'{}' repeats column names; renamed to {:?}",
                path.display(),
                columns
            );
        }
        if columns.is_empty() {
            return Err(TableError::MissingHeader {
                path: path.to_path_buf(),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TableError::csv(path, e))?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(Self { columns, rows })
    }

    /// Concatenates row sets vertically.
    ///
    /// The resulting header is the union of all headers, each column placed where it
    /// was first seen. A row gets an empty cell for every column its own set lacks.
    pub fn concat<I: IntoIterator<Item = RowSet>>(sets: I) -> Self {
        let mut combined = RowSet::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for set in sets {
            let positions: Vec<usize> = set
                .columns
                .iter()
                .map(|column| {
                    *index.entry(column.clone()).or_insert_with(|| {
                        combined.columns.push(column.clone());
                        combined.columns.len() - 1
                    })
                })
                .collect();

            for row in set.rows {
                let mut aligned = vec![String::new(); combined.columns.len()];
                for (value, &pos) in row.into_iter().zip(&positions) {
                    aligned[pos] = value;
                }
                combined.rows.push(aligned);
            }
        }

        let width = combined.columns.len();
        for row in &mut combined.rows {
            row.resize(width, String::new());
        }
        combined
    }

    /// Writes the header and all rows, creating the parent directory if needed.
    pub fn write_to_path(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
        }

        let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
        writer
            .write_record(&self.columns)
            .map_err(|e| TableError::csv(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| TableError::csv(path, e))?;
        }
        writer.flush().map_err(|e| TableError::io(path, e))
    }
}

/// Keeps the first occurrence of every name; later repeats become `name.N` with the
/// smallest `N` that collides with neither an original nor a generated name.
fn dedup_columns(columns: &[String]) -> Vec<String> {
    let reserved: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(columns.len());

    for column in columns {
        if taken.insert(column.clone()) {
            unique.push(column.clone());
            continue;
        }
        let suffix = next_suffix.entry(column.as_str()).or_insert(1);
        let mut candidate = format!("{}.{}", column, suffix);
        while reserved.contains(candidate.as_str()) || taken.contains(&candidate) {
            *suffix += 1;
            candidate = format!("{}.{}", column, suffix);
        }
        *suffix += 1;
        taken.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}

impl From<&FeatureRow> for RowSet {
    fn from(row: &FeatureRow) -> Self {
        Self {
            columns: row.columns().to_vec(),
            rows: vec![row.values().to_vec()],
        }
    }
}
