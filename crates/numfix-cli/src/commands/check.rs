use crate::commands::print_json;
use anyhow::Result;
use clap::Args;
use numfix_core::{normalize, CountryRegistry, NumberCheckDto};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Country abbreviation, e.g. rsa
    pub country: String,
    pub number: String,
}

pub fn check_number(registry: &CountryRegistry, json: bool, args: CheckArgs) -> Result<()> {
    let record = normalize(registry, &args.country, &args.number)?;

    if json {
        return print_json(&NumberCheckDto::from(&record));
    }

    if record.is_valid() {
        println!("{} is valid", record.raw_input());
        return Ok(());
    }

    println!("{} -> {}", record.raw_input(), record.working_value());
    for change in record.changes() {
        println!("  {}", change);
    }
    Ok(())
}
