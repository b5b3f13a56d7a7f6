/*
 * Reference price service that coordinates all pipeline stages
 */

use reqwest::Client;
use std::sync::Arc;
use tracing::info;
use crate::{
    analytics,
    cex::{create_price_source, PriceSource},
    config::Config,
    fx::RateConverter,
    models::{PriceOutcome, QuorumError, ReferencePrice, Result},
    orchestrator,
};

pub struct QuoteService {
    sources: Vec<Arc<dyn PriceSource>>,
    converter: RateConverter,
    quote_currency: String,
    target_currency: String,
}

impl QuoteService {
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing quote service");

        let client = Client::builder()
            .build()
            .map_err(|e| QuorumError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let sources: Vec<Arc<dyn PriceSource>> = config
            .sources
            .iter()
            .map(|source| -> Arc<dyn PriceSource> {
                Arc::from(create_price_source(
                    source.provider,
                    client.clone(),
                    source.descriptor.clone(),
                    &config.asset.asset_id,
                    &config.asset.quote_currency,
                ))
            })
            .collect();
        info!("{} price sources initialized", sources.len());

        let converter = RateConverter::new(
            client,
            config.rate.endpoint.clone(),
            &config.asset.asset_id,
            config.rate.timeout,
        );

        Self::from_parts(
            sources,
            converter,
            &config.asset.quote_currency,
            &config.asset.target_currency,
        )
    }

    /// Builds a service from already constructed stages.
    pub fn from_parts(
        sources: Vec<Arc<dyn PriceSource>>,
        converter: RateConverter,
        quote_currency: &str,
        target_currency: &str,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(QuorumError::ConfigError(
                "At least one price source is required".to_string(),
            ));
        }

        Ok(Self {
            sources,
            converter,
            quote_currency: quote_currency.to_lowercase(),
            target_currency: target_currency.to_lowercase(),
        })
    }

    pub async fn collect_outcomes(&self) -> Vec<PriceOutcome> {
        orchestrator::fetch_all(&self.sources).await
    }

    /// Runs fetch, aggregate and convert once. Per-source failures are
    /// absorbed; only a total source failure or a rate failure is returned.
    pub async fn compute_converted_price(&self) -> Result<ReferencePrice> {
        info!(
            "Computing {} reference price from {} sources",
            self.target_currency,
            self.sources.len()
        );

        let outcomes = self.collect_outcomes().await;
        let aggregate = analytics::aggregate(&outcomes)?;
        info!(
            "Mean {} price {:.2} from {}/{} sources",
            self.quote_currency, aggregate.mean_price, aggregate.success_count, aggregate.source_count
        );

        self.converter
            .convert(aggregate, &self.quote_currency, &self.target_currency)
            .await
    }
}
