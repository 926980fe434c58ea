//! pathlock-ctl - Run programs with filesystem access limited by Landlock

mod cli;
mod commands;
mod logging;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{check_requirements, list_presets, show};
use console::style;
use runner::{run_locked, RunConfig};

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Check => {
            check_requirements();
            Ok(())
        }
        Commands::Presets => {
            list_presets();
            Ok(())
        }
        Commands::Show { rules } => show(rules).map_err(Into::into),
        Commands::Run {
            rules,
            safety,
            program,
            args,
        } => run_locked(RunConfig {
            rules,
            safety,
            program,
            args,
        }),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
