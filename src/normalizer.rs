use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use metrics::counter;
use serde_json::Value;

use crate::types::{CanonicalTransaction, RawTransaction};

const METRIC_RECORDS_DROPPED: &str = "records_dropped_total";

/// Validate and flatten one raw record into its canonical shape.
///
/// Returns `None` when the record fails the data-quality filter: `actionData`
/// absent or not an object, amount or price missing/unparseable, a non-finite
/// USD product, or a timestamp outside the representable range. A missing
/// price must never contribute zero volume, so such records are excluded
/// entirely rather than defaulted.
pub fn normalize(raw: &RawTransaction) -> Option<CanonicalTransaction> {
    let data = raw.action_data.as_ref()?.as_object()?;

    let amount = data.get("amount").and_then(parse_numeric)?;
    let price_usd = data.get("assetPriceUSD").and_then(parse_numeric)?;

    let amount_usd = amount * price_usd;
    if !amount_usd.is_finite() {
        return None;
    }

    let timestamp = to_utc(raw.timestamp)?;
    let asset_symbol = data
        .get("assetSymbol")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(CanonicalTransaction {
        wallet: raw.user_wallet.clone(),
        action: raw.action.to_lowercase(),
        asset_symbol,
        timestamp,
        amount_usd,
    })
}

/// Normalize a batch, keeping the drop count observable for auditing.
pub fn normalize_all(records: &[RawTransaction]) -> (Vec<CanonicalTransaction>, u64) {
    let mut canonical = Vec::with_capacity(records.len());
    let mut dropped = 0u64;

    for raw in records {
        match normalize(raw) {
            Some(tx) => canonical.push(tx),
            None => {
                dropped += 1;
                counter!(METRIC_RECORDS_DROPPED, 1);
                debug!(
                    "Dropping malformed record for wallet {} (action {})",
                    raw.user_wallet, raw.action
                );
            }
        }
    }

    if dropped > 0 {
        warn!(
            "Dropped {} of {} records during normalization",
            dropped,
            records.len()
        );
    }
    (canonical, dropped)
}

// The source feed serializes amounts sometimes as JSON numbers and sometimes
// as decimal strings; both are accepted, nothing else is.
fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn to_utc(unix_seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(unix_seconds, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(action_data: Option<Value>) -> RawTransaction {
        RawTransaction {
            user_wallet: "0xabc".to_string(),
            network: "polygon".to_string(),
            protocol: "aave_v2".to_string(),
            action: "Deposit".to_string(),
            timestamp: 1_629_178_166,
            action_data,
        }
    }

    #[test]
    fn normalizes_string_and_numeric_fields() {
        let tx = normalize(&raw(Some(json!({
            "amount": "2000",
            "assetPriceUSD": 1.5,
            "assetSymbol": "USDC",
        }))))
        .unwrap();

        assert_eq!(tx.amount_usd, 3000.0);
        assert_eq!(tx.action, "deposit");
        assert_eq!(tx.asset_symbol, "USDC");
        assert_eq!(tx.timestamp.timestamp(), 1_629_178_166);
    }

    #[test]
    fn drops_missing_action_data() {
        assert!(normalize(&raw(None)).is_none());
        assert!(normalize(&raw(Some(Value::Null))).is_none());
        assert!(normalize(&raw(Some(json!("not an object")))).is_none());
    }

    #[test]
    fn drops_missing_or_unparseable_amount_and_price() {
        assert!(normalize(&raw(Some(json!({ "amount": "100" })))).is_none());
        assert!(normalize(&raw(Some(json!({ "assetPriceUSD": "1.0" })))).is_none());
        assert!(normalize(&raw(Some(json!({
            "amount": "not-a-number",
            "assetPriceUSD": "1.0",
        }))))
        .is_none());
        assert!(normalize(&raw(Some(json!({
            "amount": ["100"],
            "assetPriceUSD": "1.0",
        }))))
        .is_none());
    }

    #[test]
    fn drops_non_finite_usd_value() {
        assert!(normalize(&raw(Some(json!({
            "amount": "1e308",
            "assetPriceUSD": "1e308",
        }))))
        .is_none());
        assert!(normalize(&raw(Some(json!({
            "amount": "NaN",
            "assetPriceUSD": "1.0",
        }))))
        .is_none());
    }

    #[test]
    fn missing_symbol_defaults_to_empty() {
        let tx = normalize(&raw(Some(json!({
            "amount": "1",
            "assetPriceUSD": "1",
        }))))
        .unwrap();
        assert_eq!(tx.asset_symbol, "");
    }

    #[test]
    fn batch_counts_drops() {
        let records = vec![
            raw(Some(json!({ "amount": "1", "assetPriceUSD": "2" }))),
            raw(None),
            raw(Some(json!({ "amount": "bad", "assetPriceUSD": "2" }))),
        ];
        let (canonical, dropped) = normalize_all(&records);
        assert_eq!(canonical.len(), 1);
        assert_eq!(dropped, 2);
    }
}
