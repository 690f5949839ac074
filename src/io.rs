use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use log::info;
use thiserror::Error;

use crate::types::{RawTransaction, ScoredWallet};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as a transaction array")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the raw transaction log: a single JSON array of records. Unknown
/// fields are ignored; structurally bad records inside the array fail the
/// load, record-level quality filtering belongs to the normalizer.
pub fn load_transactions(path: &Path) -> Result<Vec<RawTransaction>, InputError> {
    let file = File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records: Vec<RawTransaction> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| InputError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
    info!(
        "Loaded {} raw transactions from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Write the score table: one wallet per row, two columns.
pub fn write_scores(path: &Path, scores: &[ScoredWallet]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["wallet", "score"])?;
    for row in scores {
        writer.serialize((row.wallet.as_str(), row.score))?;
    }
    writer.flush()?;
    info!("Wrote {} wallet scores to {}", scores.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_array_and_ignores_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "userWallet": "0xabc",
                "network": "polygon",
                "protocol": "aave_v2",
                "action": "deposit",
                "timestamp": 1629178166,
                "txHash": "0xdeadbeef",
                "actionData": {{"amount": "100", "assetPriceUSD": "1", "assetSymbol": "USDC"}}
            }}]"#
        )
        .unwrap();

        let records = load_transactions(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_wallet, "0xabc");
        assert_eq!(records[0].timestamp, 1_629_178_166);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_transactions(Path::new("/nonexistent/transactions.json")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[test]
    fn non_array_input_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();
        let err = load_transactions(file.path()).unwrap_err();
        assert!(matches!(err, InputError::Json { .. }));
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let scores = vec![
            ScoredWallet {
                wallet: "0xabc".to_string(),
                score: 712.5,
            },
            ScoredWallet {
                wallet: "0xdef".to_string(),
                score: 0.0,
            },
        ];
        write_scores(&path, &scores).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("wallet,score"));
        assert_eq!(lines.next(), Some("0xabc,712.5"));
        assert_eq!(lines.next(), Some("0xdef,0.0"));
    }
}
