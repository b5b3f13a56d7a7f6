/*
 * Coinbase spot price source
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use crate::cex::PriceSource;
use crate::models::{QuorumError, Result, SourceDescriptor};
use crate::utils::{ensure_positive, fetch_body, parse_price_str};

pub struct CoinbaseSource {
    client: Client,
    descriptor: SourceDescriptor,
}

#[derive(Debug, Deserialize)]
struct CoinbaseSpotResponse {
    data: CoinbaseSpot,
}

#[derive(Debug, Deserialize)]
struct CoinbaseSpot {
    amount: String,
}

impl CoinbaseSource {
    #[must_use]
    pub fn new(client: Client, descriptor: SourceDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn decode(body: &str) -> Result<f64> {
        let response: CoinbaseSpotResponse = serde_json::from_str(body)
            .map_err(|e| QuorumError::DecodeError(format!("Failed to parse Coinbase response: {e}")))?;

        parse_price_str(&response.data.amount)
    }
}

#[async_trait]
impl PriceSource for CoinbaseSource {
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
