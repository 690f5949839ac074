use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};
use log::debug;

use crate::aggregator::WalletFeatures;

/// Inclusive value range of one feature across the wallet population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        match values.minmax() {
            MinMaxResult::NoElements => Self { min: 0.0, max: 0.0 },
            MinMaxResult::OneElement(v) => Self { min: v, max: v },
            MinMaxResult::MinMax(min, max) => Self { min, max },
        }
    }

    /// Min-max projection into [0, 1]. A zero-variance feature projects to 0
    /// for every wallet instead of dividing by zero.
    pub fn project(&self, value: f64) -> f64 {
        if self.max == self.min {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}

/// Population min/max for exactly the features the scoring formula consumes.
/// One bound per scored feature, held structurally so the scaled set and the
/// scored set cannot drift apart. `num_liquidations` is deliberately absent:
/// it feeds the penalty term as a raw count.
#[derive(Debug, Clone)]
pub struct PopulationStats {
    pub repayment_ratio: Bounds,
    pub total_deposited_usd: Bounds,
    pub wallet_age_days: Bounds,
    pub deposit_count: Bounds,
    pub num_unique_actions: Bounds,
    pub num_unique_assets: Bounds,
    pub redeem_to_deposit_ratio: Bounds,
}

impl PopulationStats {
    /// Requires the complete population. Min/max are population statistics,
    /// so no wallet may be scaled before every wallet has been aggregated.
    pub fn from_population(features: &HashMap<String, WalletFeatures>) -> Self {
        let bounds =
            |f: fn(&WalletFeatures) -> f64| Bounds::from_values(features.values().map(f));

        let stats = Self {
            repayment_ratio: bounds(|w| w.repayment_ratio),
            total_deposited_usd: bounds(|w| w.total_deposited_usd),
            wallet_age_days: bounds(|w| w.wallet_age_days),
            deposit_count: bounds(|w| w.deposit_count() as f64),
            num_unique_actions: bounds(|w| w.num_unique_actions as f64),
            num_unique_assets: bounds(|w| w.num_unique_assets as f64),
            redeem_to_deposit_ratio: bounds(|w| w.redeem_to_deposit_ratio),
        };
        debug!("Population stats: {:?}", stats);
        stats
    }
}

/// A wallet's feature vector with every scored feature projected into [0, 1]
/// under the population bounds.
#[derive(Debug, Clone)]
pub struct ScaledFeatures {
    pub repayment_ratio: f64,
    pub total_deposited_usd: f64,
    pub wallet_age_days: f64,
    pub deposit_count: f64,
    pub num_unique_actions: f64,
    pub num_unique_assets: f64,
    pub redeem_to_deposit_ratio: f64,
    /// Raw count, never scaled.
    pub num_liquidations: u64,
}

pub fn scale_wallet(features: &WalletFeatures, stats: &PopulationStats) -> ScaledFeatures {
    ScaledFeatures {
        repayment_ratio: stats.repayment_ratio.project(features.repayment_ratio),
        total_deposited_usd: stats
            .total_deposited_usd
            .project(features.total_deposited_usd),
        wallet_age_days: stats.wallet_age_days.project(features.wallet_age_days),
        deposit_count: stats.deposit_count.project(features.deposit_count() as f64),
        num_unique_actions: stats
            .num_unique_actions
            .project(features.num_unique_actions as f64),
        num_unique_assets: stats
            .num_unique_assets
            .project(features.num_unique_assets as f64),
        redeem_to_deposit_ratio: stats
            .redeem_to_deposit_ratio
            .project(features.redeem_to_deposit_ratio),
        num_liquidations: features.num_liquidations,
    }
}

pub fn scale(
    features: &HashMap<String, WalletFeatures>,
    stats: &PopulationStats,
) -> HashMap<String, ScaledFeatures> {
    features
        .iter()
        .map(|(wallet, f)| (wallet.clone(), scale_wallet(f, stats)))
        .collect()
}
