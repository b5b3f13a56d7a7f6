/*
 * Bitstamp ticker source
 */

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use crate::cex::PriceSource;
use crate::models::{QuorumError, Result, SourceDescriptor};
use crate::utils::{ensure_positive, fetch_body, parse_price_str};

const LAST_TRADE_FIELD: &str = "last";

pub struct BitstampSource {
    client: Client,
    descriptor: SourceDescriptor,
}

impl BitstampSource {
    #[must_use]
    pub fn new(client: Client, descriptor: SourceDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn decode(body: &str) -> Result<f64> {
        let ticker: HashMap<String, Value> = serde_json::from_str(body)
            .map_err(|e| QuorumError::DecodeError(format!("Failed to parse Bitstamp response: {e}")))?;

        let last = ticker
            .get(LAST_TRADE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                QuorumError::DecodeError(format!("No {LAST_TRADE_FIELD:?} field in Bitstamp ticker"))
            })?;

        parse_price_str(last)
    }
}

#[async_trait]
impl PriceSource for BitstampSource {
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
