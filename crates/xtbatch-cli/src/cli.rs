use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "xtbatch",
    author = "xtbatch contributors",
    version,
    about = "xtbatch - batch extraction of xTB electronic-structure features for molecular geometry datasets.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override a configuration value (e.g., -S xtb.method=gfn1). Can be repeated.
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the total number of molecules in the dataset.
    Size,
    /// Compute xTB features for one contiguous batch of molecules.
    GenerateBatch(GenerateBatchArgs),
    /// Concatenate per-molecule feature files into a single table.
    CombineXtb(CombineArgs),
}

/// Arguments for the `generate-batch` subcommand.
#[derive(Args, Debug)]
pub struct GenerateBatchArgs {
    /// Position of the first molecule of the batch in the sorted molecule list.
    #[arg(long = "start_index", alias = "start-index", value_name = "INT")]
    pub start_index: usize,

    /// Number of molecules in the batch [default: 50]
    #[arg(long = "batch_size", alias = "batch-size", value_name = "INT",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,

    /// Directory receiving one feature file per molecule.
    #[arg(long = "output_dir", alias = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `combine-xtb` subcommand.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Directory holding the per-molecule feature files.
    #[arg(long = "input-dir", alias = "input_dir", value_name = "PATH")]
    pub input_dir: Option<PathBuf>,

    /// Path of the combined table to write.
    #[arg(long = "output-file", alias = "output_file", value_name = "PATH")]
    pub output_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_batch_with_underscored_flags() {
        let cli = Cli::parse_from([
            "xtbatch",
            "generate-batch",
            "--start_index",
            "100",
            "--batch_size",
            "25",
            "--output_dir",
            "out/reps",
        ]);

        let Commands::GenerateBatch(args) = cli.command else {
            panic!("expected generate-batch");
        };
        assert_eq!(args.start_index, 100);
        assert_eq!(args.batch_size, Some(25));
        assert_eq!(args.output_dir, Some(PathBuf::from("out/reps")));
    }

    #[test]
    fn generate_batch_accepts_hyphenated_aliases() {
        let cli = Cli::parse_from(["xtbatch", "generate-batch", "--start-index", "7"]);

        let Commands::GenerateBatch(args) = cli.command else {
            panic!("expected generate-batch");
        };
        assert_eq!(args.start_index, 7);
        assert_eq!(args.batch_size, None);
        assert_eq!(args.output_dir, None);
    }

    #[test]
    fn generate_batch_requires_start_index() {
        assert!(Cli::try_parse_from(["xtbatch", "generate-batch"]).is_err());
        assert!(Cli::try_parse_from(["xtbatch", "generate-batch", "--start_index", "-1"]).is_err());
    }

    #[test]
    fn generate_batch_rejects_zero_batch_size() {
        assert!(
            Cli::try_parse_from([
                "xtbatch",
                "generate-batch",
                "--start_index",
                "0",
                "--batch_size",
                "0"
            ])
            .is_err()
        );
    }

    #[test]
    fn parses_combine_and_global_flags() {
        let cli = Cli::parse_from([
            "xtbatch",
            "combine-xtb",
            "--input-dir",
            "reps",
            "--output-file",
            "all.csv",
            "-vv",
            "-S",
            "output.batch-size=5",
            "--config",
            "xtbatch.toml",
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.set_values, vec!["output.batch-size=5".to_string()]);
        assert_eq!(cli.config, Some(PathBuf::from("xtbatch.toml")));
        let Commands::CombineXtb(args) = cli.command else {
            panic!("expected combine-xtb");
        };
        assert_eq!(args.input_dir, Some(PathBuf::from("reps")));
        assert_eq!(args.output_file, Some(PathBuf::from("all.csv")));
    }

    #[test]
    fn parses_size() {
        let cli = Cli::parse_from(["xtbatch", "size", "-q"]);
        assert!(matches!(cli.command, Commands::Size));
        assert!(cli.quiet);
    }
}
