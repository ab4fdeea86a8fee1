use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use numfix_store::paths;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Socket address to bind, overriding `server.listen` from the config file
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

pub fn launch(
    db_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    args: ServeArgs,
    verbose: bool,
) -> Result<()> {
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    if verbose {
        eprintln!("db: {}", db_path.display());
    }
    let mut command = build_command(&db_path, config_path, args.listen, verbose);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = command.exec();
        Err(exec_error(err))
    }

    #[cfg(not(unix))]
    {
        let status = command.status().with_context(|| "launch numfix-server")?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

fn build_command(
    db_path: &Path,
    config_path: Option<PathBuf>,
    listen: Option<SocketAddr>,
    verbose: bool,
) -> Command {
    let binary = find_server_binary();
    let mut command = Command::new(binary);
    command.arg("--db-path").arg(db_path);
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    if let Some(addr) = listen {
        command.arg("--listen").arg(addr.to_string());
    }
    if verbose {
        command.arg("--verbose");
    }
    command
}

fn find_server_binary() -> PathBuf {
    let name = format!("numfix-server{}", env::consts::EXE_SUFFIX);
    if let Ok(current) = env::current_exe() {
        if let Some(dir) = current.parent() {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    PathBuf::from(name)
}

fn exec_error(err: std::io::Error) -> anyhow::Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        return anyhow!(
            "numfix-server binary not found; build it with `cargo build -p numfix-server` or install the package"
        );
    }
    anyhow!("launch numfix-server failed: {}", err)
}
