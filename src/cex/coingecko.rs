/*
 * CoinGecko simple price source
 */

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use crate::cex::PriceSource;
use crate::models::{QuorumError, Result, SourceDescriptor};
use crate::utils::{ensure_positive, fetch_body};

/// `{"<asset>": {"<currency>": <price>}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoSource {
    client: Client,
    descriptor: SourceDescriptor,
    asset_id: String,
    currency: String,
}

impl CoinGeckoSource {
    #[must_use]
    pub fn new(client: Client, descriptor: SourceDescriptor, asset_id: &str, currency: &str) -> Self {
        Self {
            client,
            descriptor,
            asset_id: asset_id.to_lowercase(),
            currency: currency.to_lowercase(),
        }
    }

    pub fn decode(&self, body: &str) -> Result<f64> {
        let response: SimplePriceResponse = serde_json::from_str(body)
            .map_err(|e| QuorumError::DecodeError(format!("Failed to parse CoinGecko response: {e}")))?;

        response
            .get(&self.asset_id)
            .and_then(|prices| prices.get(&self.currency))
            .copied()
            .ok_or_else(|| {
                QuorumError::DecodeError(format!(
                    "No {}/{} price in CoinGecko response",
                    self.asset_id, self.currency
                ))
            })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn timeout(&self) -> Duration {
        self.descriptor.timeout
    }

    async fn fetch_price(&self) -> Result<f64> {
        let body = fetch_body(&self.client, &self.descriptor).await?;
        ensure_positive(self.decode(&body)?)
    }
}
