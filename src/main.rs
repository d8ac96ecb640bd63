//! Botcheck CLI entry point.

use botcheck::cli::{self, Cli, Commands, EXIT_ERROR};
use botcheck::logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: {}", e);
    }

    let result = match &cli.command {
        Commands::Lint(args) => cli::run_lint(args),
        Commands::Catalog(args) => cli::run_catalog(args),
        Commands::Detectors => cli::run_detectors(),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
