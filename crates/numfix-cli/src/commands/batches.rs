use crate::commands::{print_json, Context, DEFAULT_BATCH_LIMIT};
use crate::util::{format_timestamp_datetime, now_utc, parse_batch_ref};
use anyhow::{Context as _, Result};
use clap::Args;
use numfix_core::{classify, parse_submission, BatchRef, BatchStats, BatchSummaryDto};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Country abbreviation applied to every row, e.g. rsa
    pub country: String,
    /// CSV file with a header row; the second column holds the number
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    pub batch_ref: String,
}

#[derive(Debug, Args)]
pub struct ResultsArgs {
    pub batch_ref: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    pub limit: i64,
}

#[derive(Debug, Serialize)]
struct BatchListItemDto {
    #[serde(rename = "ref")]
    batch_ref: BatchRef,
    country_code: String,
    created_at: i64,
    href: String,
}

pub fn import(ctx: &Context<'_>, args: ImportArgs) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("open submission {}", args.file.display()))?;
    let numbers = parse_submission(BufReader::new(file))
        .with_context(|| format!("read submission {}", args.file.display()))?;

    let batch = classify(ctx.registry, &args.country, &numbers);
    let stats = ctx
        .store
        .batches()
        .save_batch(now_utc(), &batch)
        .with_context(|| format!("store batch {}", batch.batch_ref))?;

    print_summary(ctx, batch.batch_ref, stats)
}

pub fn stats(ctx: &Context<'_>, args: StatsArgs) -> Result<()> {
    let batch_ref = parse_batch_ref(&args.batch_ref)?;
    let stats = ctx.store.batches().stats_for(&batch_ref)?;
    print_summary(ctx, batch_ref, stats)
}

pub fn results(ctx: &Context<'_>, args: ResultsArgs) -> Result<()> {
    let batch_ref = parse_batch_ref(&args.batch_ref)?;
    let results = ctx.store.batches().results_for(&batch_ref)?;

    if ctx.json {
        return print_json(&results);
    }

    println!("valid ({}):", results.valid_numbers.len());
    for number in &results.valid_numbers {
        println!("  {}", number);
    }
    println!("fixed ({}):", results.fixed_numbers.len());
    for fixed in &results.fixed_numbers {
        println!(
            "  {} -> {} ({})",
            fixed.original_number, fixed.fixed_number, fixed.changes
        );
    }
    println!("rejected ({}):", results.rejected_numbers.len());
    for number in &results.rejected_numbers {
        println!("  {}", number);
    }
    Ok(())
}

pub fn list(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let batches = ctx.store.batches().list(args.limit)?;
    let items: Vec<BatchListItemDto> = batches
        .into_iter()
        .map(|batch| BatchListItemDto {
            href: ctx.config.server.batch_href(&batch.batch_ref.to_string()),
            batch_ref: batch.batch_ref,
            country_code: batch.country_code,
            created_at: batch.created_at,
        })
        .collect();

    if ctx.json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("no batches");
        return Ok(());
    }

    for item in items {
        println!(
            "{}  {}  {}",
            item.batch_ref,
            item.country_code,
            format_timestamp_datetime(item.created_at)
        );
    }
    Ok(())
}

fn print_summary(ctx: &Context<'_>, batch_ref: BatchRef, stats: BatchStats) -> Result<()> {
    let summary = BatchSummaryDto {
        batch_ref,
        stats,
        href: ctx.config.server.batch_href(&batch_ref.to_string()),
    };

    if ctx.json {
        return print_json(&summary);
    }

    println!(
        "batch {}: {} valid, {} fixed, {} rejected ({} total)",
        summary.batch_ref,
        stats.valid_numbers_count,
        stats.fixed_numbers_count,
        stats.invalid_numbers_count,
        stats.total_numbers_processed
    );
    println!("{}", summary.href);
    Ok(())
}
