use crate::commands::print_json;
use anyhow::Result;
use clap::Args;
use numfix_core::{CountryProfile, CountryRegistry};

#[derive(Debug, Args)]
pub struct CountriesArgs {}

pub fn list_countries(registry: &CountryRegistry, json: bool, _args: CountriesArgs) -> Result<()> {
    let profiles: Vec<&CountryProfile> = registry.profiles().collect();

    if json {
        return print_json(&profiles);
    }

    for profile in profiles {
        println!(
            "{}  prefix {}  length {}",
            profile.code, profile.dialing_prefix, profile.required_length
        );
    }
    Ok(())
}
