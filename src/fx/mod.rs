/*
 * Exchange-rate lookup and conversion of the aggregate quote
 */

use reqwest::{Client, Url};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use crate::models::{AggregateQuote, ExchangeRate, QuorumError, ReferencePrice, Result};

/// `{"<asset>": {"<currency>": <rate>, ...}}`
type RateResponse = HashMap<String, HashMap<String, f64>>;

/// Derives a fiat cross rate from one reference asset priced in both
/// currencies, then rescales an aggregate quote with it.
pub struct RateConverter {
    client: Client,
    endpoint: Url,
    asset_id: String,
    timeout: Duration,
}

impl RateConverter {
    /// Any query already on `endpoint` is dropped; `fetch_rate` supplies
    /// `ids` and `vs_currencies` itself.
    #[must_use]
    pub fn new(client: Client, mut endpoint: Url, asset_id: &str, timeout: Duration) -> Self {
        endpoint.set_query(None);
        Self {
            client,
            endpoint,
            asset_id: asset_id.to_lowercase(),
            timeout,
        }
    }

    pub async fn fetch_rate(&self, quote: &str, target: &str) -> Result<ExchangeRate> {
        let quote = quote.to_lowercase();
        let target = target.to_lowercase();
        let currencies = format!("{quote},{target}");
        debug!("GET {} for {} rates in {}", self.endpoint, self.asset_id, currencies);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("ids", self.asset_id.as_str()), ("vs_currencies", currencies.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| QuorumError::RateFetchError(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuorumError::RateFetchError(format!(
                "Unexpected HTTP status: {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| QuorumError::RateFetchError(format!("Failed to read body: {e}")))?;

        self.decode_rate(&body, &quote, &target)
    }

    pub fn decode_rate(&self, body: &str, quote: &str, target: &str) -> Result<ExchangeRate> {
        let rates: RateResponse = serde_json::from_str(body)
            .map_err(|e| QuorumError::RateFetchError(format!("Failed to decode rates: {e}")))?;

        let asset_rates = rates.get(&self.asset_id).ok_or_else(|| {
            QuorumError::InvalidRateError(format!("No rates for {}", self.asset_id))
        })?;
        let quote_rate = usable_rate(asset_rates, quote)?;
        let target_rate = usable_rate(asset_rates, target)?;

        Ok(ExchangeRate {
            quote_currency: quote.to_string(),
            target_currency: target.to_string(),
            ratio: target_rate / quote_rate,
        })
    }

    pub async fn convert(&self, aggregate: AggregateQuote, quote: &str, target: &str) -> Result<ReferencePrice> {
        let rate = self.fetch_rate(quote, target).await?;
        let price = apply_rate(&aggregate, &rate);
        info!(
            "Converted {:.2} {} to {:.2} {} (ratio {:.6})",
            aggregate.mean_price, rate.quote_currency, price, rate.target_currency, rate.ratio
        );

        Ok(ReferencePrice {
            price,
            currency: rate.target_currency.clone(),
            aggregate,
            rate,
        })
    }
}

#[must_use]
pub fn apply_rate(aggregate: &AggregateQuote, rate: &ExchangeRate) -> f64 {
    aggregate.mean_price * rate.ratio
}

fn usable_rate(rates: &HashMap<String, f64>, currency: &str) -> Result<f64> {
    match rates.get(currency) {
        Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
        Some(rate) => Err(QuorumError::InvalidRateError(format!("{currency} rate is {rate}"))),
        None => Err(QuorumError::InvalidRateError(format!("{currency} rate missing"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn converter() -> RateConverter {
        RateConverter::new(
            Client::new(),
            "http://localhost/simple/price".parse().unwrap(),
            "ethereum",
            Duration::from_secs(1),
        )
    }

    #[test]
    fn ratio_is_target_over_quote() {
        let rate = converter()
            .decode_rate(r#"{"ethereum":{"usd":3000,"aud":4500}}"#, "usd", "aud")
            .unwrap();
        assert_eq!(rate.ratio, 1.5);

        let aggregate = AggregateQuote {
            mean_price: 3000.0,
            success_count: 3,
            source_count: 5,
            timestamp: Utc::now(),
        };
        assert_eq!(apply_rate(&aggregate, &rate), 4500.0);
    }

    #[test]
    fn zero_target_rate_is_invalid() {
        let err = converter()
            .decode_rate(r#"{"ethereum":{"usd":3000,"aud":0}}"#, "usd", "aud")
            .unwrap_err();
        assert!(matches!(err, QuorumError::InvalidRateError(_)));
    }

    #[test]
    fn missing_currency_is_invalid() {
        let err = converter()
            .decode_rate(r#"{"ethereum":{"usd":3000}}"#, "usd", "aud")
            .unwrap_err();
        assert!(matches!(err, QuorumError::InvalidRateError(_)));
    }

    #[test]
    fn endpoint_query_is_replaced_not_extended() {
        let converter = RateConverter::new(
            Client::new(),
            "http://localhost/simple/price?ids=ethereum&vs_currencies=usd,aud"
                .parse()
                .unwrap(),
            "ethereum",
            Duration::from_secs(1),
        );
        assert_eq!(converter.endpoint.query(), None);
        assert_eq!(converter.endpoint.path(), "/simple/price");
    }

    #[test]
    fn malformed_body_is_a_fetch_error() {
        let err = converter().decode_rate("<html>", "usd", "aud").unwrap_err();
        assert!(matches!(err, QuorumError::RateFetchError(_)));
    }
}
