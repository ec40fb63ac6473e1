use crate::cli::CombineArgs;
use crate::config::AppConfig;
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use xtbatch::workflows::combine::{self, CombineOutcome};

pub fn run(args: CombineArgs, config: &AppConfig) -> Result<()> {
    let (input_dir, output_file) = resolve_paths(args, config);
    info!(
        "Combining feature files from {} into {}",
        input_dir.display(),
        output_file.display()
    );

    match combine::run(&input_dir, &output_file)? {
        CombineOutcome::NothingToCombine => {
            println!(
                "No feature files found in {}. Nothing to combine.",
                input_dir.display()
            );
        }
        CombineOutcome::Combined {
            files,
            rows,
            columns,
            output,
        } => {
            println!(
                "Combined {} entries ({} columns) from {} files into {}",
                rows,
                columns,
                files,
                output.display()
            );
        }
    }
    Ok(())
}

fn resolve_paths(args: CombineArgs, config: &AppConfig) -> (PathBuf, PathBuf) {
    (
        args.input_dir.unwrap_or_else(|| config.batch_dir.clone()),
        args.output_file
            .unwrap_or_else(|| config.combined_file.clone()),
    )
}
