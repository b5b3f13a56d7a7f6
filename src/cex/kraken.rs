/*
 * Kraken public ticker source
 */

use crate::cex::PriceSource;
use crate::models::{QuorumError, Result, SourceDescriptor};
use crate::utils::{ensure_positive, fetch_body, parse_price_str};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub struct KrakenSource {
    client: Client,
    descriptor: SourceDescriptor,
}

#[derive(Debug, Deserialize)]
struct KrakenResponse {
    #[serde(default)]
    error: Vec<String>,
    result: Option<HashMap<String, KrakenTicker>>,
}

#[derive(Debug, Deserialize)]
struct KrakenTicker {
    /// Last trade closed: `[price, lot volume]`.
    c: Vec<String>,
}

impl KrakenSource {
    #[must_use]
    pub fn new(client: Client, descriptor: SourceDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn decode(body: &str) -> Result<f64> {
        let response: KrakenResponse = serde_json::from_str(body).map_err(|e| {
            QuorumError::DecodeError(format!("Failed to parse Kraken response: {e}"))
        })?;

        if !response.error.is_empty() {
            return Err(QuorumError::DecodeError(format!(
                "Kraken API error: {:?}",
                response.error
            )));
        }

        let result = response
            .result
            .ok_or_else(|| QuorumError::DecodeError("No result in Kraken response".to_string()))?;

        // The pair key is opaque (e.g. XETHZUSD) and the map holds one entry.
        let ticker = result
            .values()
            .next()
            .ok_or_else(|| QuorumError::DecodeError("No ticker data found".to_string()))?;

        let price_str = ticker
            .c
            .first()
            .ok_or_else(|| QuorumError::DecodeError("No price data found".to_string()))?;

        parse_price_str(price_str)
    }
}

#[async_trait]
impl PriceSource for KrakenSource {
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
