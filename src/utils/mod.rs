/*
 * Utility functions and helpers
 */

use crate::models::{QuorumError, Result, SourceDescriptor};
use reqwest::Client;
use tracing::debug;

/// Issues one bounded GET against the descriptor's endpoint and returns the
/// raw body. Transport failures and timeouts map to `NetworkError`, any
/// non-2xx status to `HttpStatusError`.
pub async fn fetch_body(client: &Client, descriptor: &SourceDescriptor) -> Result<String> {
    debug!("GET {} for {}", descriptor.endpoint, descriptor.name);

    let response = client
        .get(descriptor.endpoint.clone())
        .timeout(descriptor.timeout)
        .send()
        .await
        .map_err(|e| QuorumError::NetworkError(format!("{} request failed: {e}", descriptor.name)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(QuorumError::HttpStatusError(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| QuorumError::NetworkError(format!("{} body read failed: {e}", descriptor.name)))
}

pub fn parse_price_str(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| QuorumError::DecodeError(format!("Failed to parse price {raw:?}: {e}")))
}

pub fn ensure_positive(price: f64) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(QuorumError::InvalidValueError(price))
    }
}
