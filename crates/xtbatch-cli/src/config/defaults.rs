use std::path::PathBuf;
use xtbatch::engine::config::{DEFAULT_BATCH_SIZE, XtbMethod};
use xtbatch::workflows::enumerate::DEFAULT_GEOMETRY_EXTENSION;

pub struct DefaultsConfig {
    pub geometry_dirs: Vec<PathBuf>,
    pub extension: String,
    pub program: PathBuf,
    pub program_args: Vec<String>,
    pub xtb_executable: PathBuf,
    pub method: XtbMethod,
    pub charge: i32,
    pub unpaired_electrons: u32,
    pub corrected: bool,
    pub batch_size: usize,
    pub batch_dir: PathBuf,
    pub combined_file: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            geometry_dirs: vec![
                PathBuf::from("bse49/Geometries/Existing"),
                PathBuf::from("bse49/Geometries/Hypothetical"),
            ],
            extension: DEFAULT_GEOMETRY_EXTENSION.to_string(),
            program: PathBuf::from("bash"),
            program_args: vec!["process_xtb/process_molecule.sh".to_string()],
            xtb_executable: PathBuf::from("xtb"),
            method: XtbMethod::Gfn2,
            charge: 0,
            unpaired_electrons: 0,
            corrected: true,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_dir: PathBuf::from("data/BSE/xtb_reps/"),
            combined_file: PathBuf::from("data/BSE/xtb_features_combined_test.csv"),
        }
    }
}
