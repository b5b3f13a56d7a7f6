/*
 * Aggregation of per-source outcomes into one reference quote
 */

use chrono::Utc;
use crate::models::{AggregateQuote, PriceOutcome, QuorumError, Result};

/// Unweighted arithmetic mean of every successful outcome. Failed outcomes
/// are skipped; no outlier or staleness filtering is applied.
pub fn aggregate(outcomes: &[PriceOutcome]) -> Result<AggregateQuote> {
    let (sum, count) = outcomes
        .iter()
        .filter_map(PriceOutcome::price)
        .fold((0.0_f64, 0_usize), |(sum, count), price| (sum + price, count + 1));

    if count == 0 {
        return Err(QuorumError::NoValidPrices {
            attempted: outcomes.len(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_price = sum / count as f64;

    Ok(AggregateQuote {
        mean_price,
        success_count: count,
        source_count: outcomes.len(),
        timestamp: Utc::now(),
    })
}
