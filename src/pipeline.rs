use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use metrics::{counter, gauge};
use rayon::prelude::*;

use crate::aggregator::aggregate;
use crate::config::ScoringConfig;
use crate::normalizer::normalize_all;
use crate::scaler::{scale_wallet, PopulationStats};
use crate::scoring::score_wallet;
use crate::types::{RawTransaction, ScoredWallet};

const METRIC_TRANSACTIONS_SEEN: &str = "transactions_seen_total";
const METRIC_WALLETS_SCORED: &str = "wallets_scored";

/// Outcome of one full pipeline run, including the audit counters.
#[derive(Debug)]
pub struct PipelineReport {
    pub scores: Vec<ScoredWallet>,
    pub transactions_seen: u64,
    pub records_dropped: u64,
}

impl PipelineReport {
    pub fn wallets(&self) -> usize {
        self.scores.len()
    }
}

/// Run the full two-phase batch pipeline: normalize and aggregate every
/// record, take the population min/max snapshot at the barrier, then scale
/// and score each wallet independently.
///
/// Empty input is not an error; it produces an empty report.
pub fn run(records: &[RawTransaction], config: &ScoringConfig) -> Result<PipelineReport> {
    config.validate_all()?;
    counter!(METRIC_TRANSACTIONS_SEEN, records.len() as u64);

    // Phase 1: every record must be normalized and aggregated before any
    // population statistic exists.
    let spinner = stage_spinner("Normalizing and aggregating transactions");
    let (canonical, dropped) = normalize_all(records);
    info!(
        "Normalized {} of {} records ({} dropped)",
        canonical.len(),
        records.len(),
        dropped
    );
    let features = aggregate(canonical);
    spinner.finish_and_clear();

    // Barrier: the min/max snapshot is computed once over the complete
    // population and is immutable from here on.
    let stats = PopulationStats::from_population(&features);

    // Phase 2: shared-nothing per wallet, safe to run as a parallel map.
    let spinner = stage_spinner("Scoring wallets");
    let scores: Vec<ScoredWallet> = features
        .par_iter()
        .map(|(wallet, feats)| score_wallet(wallet, &scale_wallet(feats, &stats), config))
        .collect();
    spinner.finish_and_clear();

    gauge!(METRIC_WALLETS_SCORED, scores.len() as f64);
    info!("Scored {} wallets", scores.len());

    Ok(PipelineReport {
        scores,
        transactions_seen: records.len() as u64,
        records_dropped: dropped,
    })
}

fn stage_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
