mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{batches, check, completions, countries, serve, Context};
use crate::error::{exit_code_for, report_error};
use numfix_config as config;
use numfix_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "numfix", version, about = "numfix CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a single number without storing it
    Check(check::CheckArgs),
    /// Classify and store every number in a CSV file
    Import(batches::ImportArgs),
    /// Show counts for a stored batch
    Stats(batches::StatsArgs),
    /// Print every stored number of a batch
    Results(batches::ResultsArgs),
    /// List stored batches, newest first
    Batches(batches::ListArgs),
    /// List supported countries
    Countries(countries::CountriesArgs),
    /// Run the HTTP server
    Serve(serve::ServeArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Serve(args) => serve::launch(db_path, config_path, args, verbose),
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path.clone()) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }
            let registry = app_config.registry();

            let command = match command {
                Command::Check(args) => return check::check_number(&registry, json, args),
                Command::Countries(args) => {
                    return countries::list_countries(&registry, json, args)
                }
                command => command,
            };

            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;

            if verbose {
                debug!(path = %db_path.display(), "database path resolved");
            }

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
                registry: &registry,
            };

            match command {
                Command::Import(args) => batches::import(&ctx, args),
                Command::Stats(args) => batches::stats(&ctx, args),
                Command::Results(args) => batches::results(&ctx, args),
                Command::Batches(args) => batches::list(&ctx, args),
                Command::Check(_) | Command::Countries(_) => {
                    unreachable!("store-free commands handled before store initialization")
                }
                Command::Serve(_) | Command::Completions(_) => {
                    unreachable!("command handled before config initialization")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
