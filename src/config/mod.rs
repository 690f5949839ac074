use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scoring policy constants. The defaults are the published values; scores
/// are only comparable across runs that share them. These are fixed policy,
/// not learned parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoringConfig {
    /// Full output span; scores are clamped to [0, score_range]
    #[validate(range(min = 1.0))]
    pub score_range: f64,
    #[validate(range(min = 0.0))]
    pub base_score: f64,

    // Positive contributors, as fractions of score_range
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_repayment_ratio: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_deposit_volume: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_wallet_age: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_deposit_count: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_action_diversity: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_asset_diversity: f64,

    // Negative contributors
    #[validate(range(min = 0.0, max = 1.0))]
    pub weight_redeem_ratio: f64,
    /// Absolute points deducted per liquidation event
    #[validate(range(min = 0.0))]
    pub liquidation_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            score_range: 1000.0,
            base_score: 500.0,
            weight_repayment_ratio: 0.40,
            weight_deposit_volume: 0.20,
            weight_wallet_age: 0.10,
            weight_deposit_count: 0.05,
            weight_action_diversity: 0.05,
            weight_asset_diversity: 0.05,
            weight_redeem_ratio: 0.20,
            liquidation_penalty: 200.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate_all(&self) -> Result<()> {
        if let Err(e) = self.validate() {
            return Err(anyhow!("Scoring configuration invalid: {:?}", e));
        }
        if self.base_score > self.score_range {
            return Err(anyhow!(
                "Base score {} exceeds score range {}",
                self.base_score,
                self.score_range
            ));
        }
        Ok(())
    }
}
