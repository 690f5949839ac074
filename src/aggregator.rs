use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::info;

use crate::types::{
    CanonicalTransaction, ACTION_BORROW, ACTION_DEPOSIT, ACTION_LIQUIDATION, ACTION_REDEEM,
    ACTION_REPAY,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Behavioral feature vector for one wallet, built in a single pass over its
/// transactions. Every numeric field defaults to 0 when the underlying action
/// never occurred; the two ratios are the only exception and follow explicit
/// fallback rules (no borrows means fully repaid, no deposits means no redeem
/// signal).
#[derive(Debug, Clone)]
pub struct WalletFeatures {
    pub total_transactions: u64,
    pub num_unique_actions: u64,
    pub num_unique_assets: u64,
    /// Sparse per-action counters, keyed by whatever labels appear in the
    /// data. Unseen actions are simply absent.
    pub action_counts: HashMap<String, u64>,
    pub first_transaction_timestamp: DateTime<Utc>,
    pub last_transaction_timestamp: DateTime<Utc>,
    pub wallet_age_days: f64,
    pub total_deposited_usd: f64,
    pub total_borrowed_usd: f64,
    pub total_repaid_usd: f64,
    pub total_redeemed_usd: f64,
    pub avg_deposit_usd: f64,
    pub avg_borrow_usd: f64,
    pub avg_repay_usd: f64,
    pub net_deposit_borrow_usd: f64,
    pub repayment_ratio: f64,
    pub redeem_to_deposit_ratio: f64,
    pub num_liquidations: u64,
}

impl WalletFeatures {
    pub fn action_count(&self, action: &str) -> u64 {
        self.action_counts.get(action).copied().unwrap_or(0)
    }

    pub fn deposit_count(&self) -> u64 {
        self.action_count(ACTION_DEPOSIT)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    action_counts: HashMap<String, u64>,
    assets: HashSet<String>,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    deposited_usd: f64,
    borrowed_usd: f64,
    repaid_usd: f64,
    redeemed_usd: f64,
}

impl Accumulator {
    fn push(&mut self, tx: &CanonicalTransaction) {
        self.count += 1;
        *self.action_counts.entry(tx.action.clone()).or_insert(0) += 1;
        // An absent symbol carries no diversity signal
        if !tx.asset_symbol.is_empty() {
            self.assets.insert(tx.asset_symbol.clone());
        }

        self.first = Some(match self.first {
            Some(first) => first.min(tx.timestamp),
            None => tx.timestamp,
        });
        self.last = Some(match self.last {
            Some(last) => last.max(tx.timestamp),
            None => tx.timestamp,
        });

        match tx.action.as_str() {
            ACTION_DEPOSIT => self.deposited_usd += tx.amount_usd,
            ACTION_BORROW => self.borrowed_usd += tx.amount_usd,
            ACTION_REPAY => self.repaid_usd += tx.amount_usd,
            ACTION_REDEEM => self.redeemed_usd += tx.amount_usd,
            _ => {}
        }
    }

    fn finish(self) -> WalletFeatures {
        let first = self.first.expect("group holds at least one transaction");
        let last = self.last.expect("group holds at least one transaction");
        let age_days = (last - first).num_seconds() as f64 / SECONDS_PER_DAY;

        let num_liquidations = self
            .action_counts
            .get(ACTION_LIQUIDATION)
            .copied()
            .unwrap_or(0);

        let repayment_ratio = if self.borrowed_usd > 0.0 {
            self.repaid_usd / self.borrowed_usd
        } else {
            // No borrowing history reads as no default risk
            1.0
        };
        let redeem_to_deposit_ratio = if self.deposited_usd > 0.0 {
            self.redeemed_usd / self.deposited_usd
        } else {
            0.0
        };

        let avg = |sum: f64, count: u64| if count > 0 { sum / count as f64 } else { 0.0 };
        let deposit_count = self.action_counts.get(ACTION_DEPOSIT).copied().unwrap_or(0);
        let borrow_count = self.action_counts.get(ACTION_BORROW).copied().unwrap_or(0);
        let repay_count = self.action_counts.get(ACTION_REPAY).copied().unwrap_or(0);

        WalletFeatures {
            total_transactions: self.count,
            num_unique_actions: self.action_counts.len() as u64,
            num_unique_assets: self.assets.len() as u64,
            first_transaction_timestamp: first,
            last_transaction_timestamp: last,
            wallet_age_days: age_days,
            avg_deposit_usd: avg(self.deposited_usd, deposit_count),
            avg_borrow_usd: avg(self.borrowed_usd, borrow_count),
            avg_repay_usd: avg(self.repaid_usd, repay_count),
            net_deposit_borrow_usd: self.deposited_usd - self.borrowed_usd,
            total_deposited_usd: self.deposited_usd,
            total_borrowed_usd: self.borrowed_usd,
            total_repaid_usd: self.repaid_usd,
            total_redeemed_usd: self.redeemed_usd,
            repayment_ratio,
            redeem_to_deposit_ratio,
            num_liquidations,
            action_counts: self.action_counts,
        }
    }
}

/// Group the canonical transaction stream by wallet and fold each group into
/// its feature vector. Input order is irrelevant; min/max timestamps make the
/// temporal bounds order-independent.
pub fn aggregate(
    transactions: impl IntoIterator<Item = CanonicalTransaction>,
) -> HashMap<String, WalletFeatures> {
    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    for tx in transactions {
        groups.entry(tx.wallet.clone()).or_default().push(&tx);
    }

    let features: HashMap<String, WalletFeatures> = groups
        .into_iter()
        .map(|(wallet, acc)| (wallet, acc.finish()))
        .collect();
    info!("Aggregated {} wallet feature vectors", features.len());
    features
}
