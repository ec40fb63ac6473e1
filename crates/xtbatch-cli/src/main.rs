mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::utils::progress::ActiveBar;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let active_bar = ActiveBar::default();
    logging::setup_logging(
        cli.verbose,
        cli.quiet,
        cli.log_file.as_deref(),
        active_bar.clone(),
    )?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 xtbatch v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = config::build_config(cli.config.as_deref(), &cli.set_values)
        .and_then(|app_config| {
            debug!("Resolved configuration: {:?}", app_config);
            match cli.command {
                Commands::Size => {
                    info!("Dispatching to 'size' command.");
                    commands::size::run(&app_config)
                }
                Commands::GenerateBatch(args) => {
                    info!("Dispatching to 'generate-batch' command.");
                    let progress = (!cli.quiet).then_some(&active_bar);
                    commands::generate::run(args, &app_config, progress)
                }
                Commands::CombineXtb(args) => {
                    info!("Dispatching to 'combine-xtb' command.");
                    commands::combine::run(args, &app_config)
                }
            }
        });

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
