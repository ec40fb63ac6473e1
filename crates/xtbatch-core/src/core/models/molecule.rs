use std::path::{Path, PathBuf};

/// File extension of per-molecule feature files.
pub const OUTPUT_EXTENSION: &str = "csv";

/// Identity of one molecule of the dataset.
///
/// The molecule name is the stem of its geometry file, and the name alone decides where
/// its features are written. Two geometry files with the same stem in different
/// directories therefore share one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeRecord {
    pub name: String,
    pub geometry_path: PathBuf,
}

impl MoleculeRecord {
    pub fn from_path(geometry_path: &Path) -> Self {
        let name = geometry_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            geometry_path: geometry_path.to_path_buf(),
        }
    }

    /// `<output_dir>/<name>.csv`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", self.name, OUTPUT_EXTENSION))
    }
}
