/*
 * Data models and types for the reference price pipeline
 */

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Static description of one price provider: who it is, where to ask and
/// how long to wait.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub name: String,
    pub endpoint: Url,
    pub timeout: Duration,
}

impl SourceDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, endpoint: Url, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            endpoint,
            timeout,
        }
    }
}

/// Result of a single fetch attempt against one source.
#[derive(Debug)]
pub struct PriceOutcome {
    source_name: String,
    result: Result<f64>,
    observed_at: DateTime<Utc>,
}

impl PriceOutcome {
    /// Wraps a fetch result. A non-positive or non-finite price is never
    /// stored as a success.
    pub fn new(source_name: impl Into<String>, result: Result<f64>) -> Self {
        let result = result.and_then(crate::utils::ensure_positive);
        Self {
            source_name: source_name.into(),
            result,
            observed_at: Utc::now(),
        }
    }

    pub fn success(source_name: impl Into<String>, price: f64) -> Self {
        Self::new(source_name, Ok(price))
    }

    pub fn failure(source_name: impl Into<String>, error: QuorumError) -> Self {
        Self::new(source_name, Err(error))
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.result.as_ref().ok().copied()
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&QuorumError> {
        self.result.as_ref().err()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateQuote {
    pub mean_price: f64,
    pub success_count: usize,
    pub source_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRate {
    pub quote_currency: String,
    pub target_currency: String,
    pub ratio: f64,
}

/// Final output of the pipeline: the aggregate quote rescaled into the
/// target currency.
#[derive(Debug, Clone, Serialize)]
pub struct ReferencePrice {
    pub price: f64,
    pub currency: String,
    pub aggregate: AggregateQuote,
    pub rate: ExchangeRate,
}

#[derive(Debug, Error)]
pub enum QuorumError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected HTTP status: {0}")]
    HttpStatusError(u16),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Invalid price value: {0}")]
    InvalidValueError(f64),

    #[error("No valid prices from {attempted} sources")]
    NoValidPrices { attempted: usize },

    #[error("Exchange rate fetch failed: {0}")]
    RateFetchError(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Fetch task aborted: {0}")]
    TaskAborted(String),
}

pub type Result<T> = std::result::Result<T, QuorumError>;
