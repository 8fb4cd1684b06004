//! Vault Sanitizer - Main entry point
//!
//! Builds the run configuration from the command line and acquires the
//! passphrase before handing over to the integrity checker.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sanitizer::{Cli, Configuration, ConfigurationBuilder, SolvableProblems, TerminalConsole};

/// Exit status for usage and validation errors
const EXIT_USAGE: u8 = 2;

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();

    if let Err(err) = result {
        eprintln!("Warning: failed to initialize logging: {err}");
    }
}

fn main() -> ExitCode {
    let solvable = SolvableProblems::all();

    let cli = match Cli::try_parse_with(std::env::args_os(), &solvable) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => {
                    eprintln!();
                    eprintln!("{}", Cli::usage(&solvable));
                    ExitCode::from(EXIT_USAGE)
                }
            };
        }
    };

    init_tracing(cli.verbose);
    debug!("CLI arguments parsed");

    let mut console = TerminalConsole::new();
    let builder = ConfigurationBuilder::new(solvable);

    let mut config = match builder.build(cli, &mut console) {
        Ok(config) => config,
        Err(err) => {
            debug!("Configuration rejected");
            eprintln!("{err}");
            if err.shows_usage() {
                eprintln!();
                eprintln!("{}", Cli::usage(builder.solvable()));
                return ExitCode::from(EXIT_USAGE);
            }
            return ExitCode::FAILURE;
        }
    };

    // The checker unlocks the vault first; acquire the passphrase up front.
    if let Err(err) = config.passphrase(&mut console) {
        debug!("Passphrase unavailable");
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match report_plan(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Print what the checker will do with this configuration.
fn report_plan(config: &Configuration) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_plan(&mut stdout, config).context("Failed to write run summary")
}

/// Never includes the passphrase.
fn write_plan(out: &mut impl Write, config: &Configuration) -> io::Result<()> {
    let problems: Vec<&str> = config.problems_to_solve().iter().map(|p| p.as_str()).collect();

    writeln!(out, "Vault:             {}", config.vault_location().display())?;
    writeln!(out, "Passphrase:        {}", config.passphrase_source())?;
    if problems.is_empty() {
        writeln!(out, "Problems to solve: none (detect only)")?;
    } else {
        writeln!(out, "Problems to solve: {}", problems.join(", "))?;
    }
    writeln!(out, "Structure report:  {}", config.structure_output_file().display())?;
    writeln!(out, "Check report:      {}", config.check_output_file().display())?;
    Ok(())
}
