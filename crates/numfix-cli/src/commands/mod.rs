use anyhow::Result;
use numfix_config::AppConfig;
use numfix_core::CountryRegistry;
use numfix_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod batches;
pub mod check;
pub mod completions;
pub mod countries;
pub mod serve;

pub const DEFAULT_BATCH_LIMIT: i64 = 20;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub registry: &'a CountryRegistry,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
