/*
 * Bitfinex v2 ticker source
 */

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use crate::cex::PriceSource;
use crate::models::{QuorumError, Result, SourceDescriptor};
use crate::utils::{ensure_positive, fetch_body};

/// Position of LAST_PRICE in
/// `[BID, BID_SIZE, ASK, ASK_SIZE, DAILY_CHANGE, DAILY_CHANGE_RELATIVE, LAST_PRICE, ...]`.
pub const LAST_PRICE_INDEX: usize = 6;

pub struct BitfinexSource {
    client: Client,
    descriptor: SourceDescriptor,
}

impl BitfinexSource {
    #[must_use]
    pub fn new(client: Client, descriptor: SourceDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn decode(body: &str) -> Result<f64> {
        let ticker: Vec<f64> = serde_json::from_str(body)
            .map_err(|e| QuorumError::DecodeError(format!("Failed to parse Bitfinex response: {e}")))?;

        ticker.get(LAST_PRICE_INDEX).copied().ok_or_else(|| {
            QuorumError::DecodeError(format!(
                "Bitfinex ticker has {} fields, need at least {}",
                ticker.len(),
                LAST_PRICE_INDEX + 1
            ))
        })
    }
}

#[async_trait]
impl PriceSource for BitfinexSource {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn timeout(&self) -> Duration {
        self.descriptor.timeout
    }

    async fn fetch_price(&self) -> Result<f64> {
        let body = fetch_body(&self.client, &self.descriptor).await?;
        ensure_positive(Self::decode(&body)?)
    }
}
