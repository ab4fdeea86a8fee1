use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use numfix_config as config;
use numfix_server::{serve, AppState};
use numfix_store::{paths, Store};
use tracing::{debug, error};

#[derive(Debug, Parser)]
#[command(name = "numfix-server", version, about = "numfix HTTP server")]
struct Args {
    #[arg(long)]
    db_path: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Socket address to bind, overriding `server.listen` from the config file
    #[arg(long)]
    listen: Option<SocketAddr>,
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{:#}", err), "server failed");
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    let app_config = config::load(args.config.clone()).with_context(|| "load config")?;
    let db_path = paths::resolve_db_path(args.db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let registry = app_config.registry();
    let mut server = app_config.server;
    if let Some(listen) = args.listen {
        server.listen = listen;
    }
    debug!(
        countries = registry.len(),
        base_url = %server.base_url(),
        "country registry loaded"
    );

    let listen = server.listen;
    let state = AppState::new(store, registry, server);
    serve(state, listen).await
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
