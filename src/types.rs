use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Action labels that carry aggregation semantics. The label set itself is
// open-ended; anything else still counts toward totals and diversity.
pub const ACTION_DEPOSIT: &str = "deposit";
pub const ACTION_BORROW: &str = "borrow";
pub const ACTION_REPAY: &str = "repay";
pub const ACTION_REDEEM: &str = "redeemunderlying";
pub const ACTION_LIQUIDATION: &str = "liquidationcall";

/// One ingested event, exactly as it appears in the source log.
/// `action_data` stays free-form because upstream emits it inconsistently;
/// the normalizer decides whether it is usable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub user_wallet: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub protocol: String,
    pub action: String,
    pub timestamp: i64,
    #[serde(default)]
    pub action_data: Option<Value>,
}

/// Flattened, validated form of a raw record. `amount_usd` is always finite;
/// records that cannot guarantee that are dropped by the normalizer.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalTransaction {
    pub wallet: String,
    pub action: String,
    pub asset_symbol: String,
    pub timestamp: DateTime<Utc>,
    pub amount_usd: f64,
}

/// Terminal artifact: one row of the output table.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredWallet {
    pub wallet: String,
    pub score: f64,
}
