use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use wallet_credit::{
    config::ScoringConfig,
    io::{load_transactions, write_scores},
    pipeline,
    utils::setup_logger,
};

/// Deterministic credit scores for DeFi wallets from a raw transaction log.
#[derive(Debug, Parser)]
#[command(name = "wallet-credit", version)]
struct Args {
    /// Path to the JSON array of raw transactions
    input: PathBuf,

    /// Path of the CSV score table to write
    #[arg(short, long, default_value = "wallet_scores.csv")]
    output: PathBuf,

    /// Sort output rows by descending score
    #[arg(long)]
    sort: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger()?;

    let config = ScoringConfig::default();
    let records = load_transactions(&args.input)?;
    let mut report = pipeline::run(&records, &config)?;

    if args.sort {
        report.scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
    write_scores(&args.output, &report.scores)?;

    info!(
        "Done: {} wallets scored from {} transactions ({} records dropped)",
        report.wallets(),
        report.transactions_seen,
        report.records_dropped
    );
    Ok(())
}
