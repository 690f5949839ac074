use crate::config::ScoringConfig;
use crate::scaler::ScaledFeatures;
use crate::types::ScoredWallet;

/// Weighted-sum credit formula over a wallet's scaled features plus the raw
/// liquidation penalty, clamped to [0, score_range]. Pure per wallet, so the
/// scoring stage can run in parallel once population statistics are fixed.
pub fn score_wallet(
    wallet: &str,
    scaled: &ScaledFeatures,
    config: &ScoringConfig,
) -> ScoredWallet {
    let range = config.score_range;

    let mut score = config.base_score;
    score += config.weight_repayment_ratio * range * scaled.repayment_ratio;
    score += config.weight_deposit_volume * range * scaled.total_deposited_usd;
    score += config.weight_wallet_age * range * scaled.wallet_age_days;
    score += config.weight_deposit_count * range * scaled.deposit_count;
    score += config.weight_action_diversity * range * scaled.num_unique_actions;
    score += config.weight_asset_diversity * range * scaled.num_unique_assets;
    score -= config.liquidation_penalty * scaled.num_liquidations as f64;
    score -= config.weight_redeem_ratio * range * scaled.redeem_to_deposit_ratio;

    ScoredWallet {
        wallet: wallet.to_string(),
        score: score.clamp(0.0, range),
    }
}
