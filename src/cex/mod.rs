/*
 * Price source adapters, one per external provider
 */

mod bitfinex;
mod bitstamp;
mod coinbase;
mod coingecko;
mod kraken;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use crate::config::Provider;
use crate::models::{Result, SourceDescriptor};

pub use bitfinex::BitfinexSource;
pub use bitstamp::BitstampSource;
pub use coinbase::CoinbaseSource;
pub use coingecko::CoinGeckoSource;
pub use kraken::KrakenSource;

#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Upper bound for one `fetch_price` call.
    fn timeout(&self) -> Duration;

    async fn fetch_price(&self) -> Result<f64>;
}

#[must_use]
pub fn create_price_source(
    provider: Provider,
    client: Client,
    descriptor: SourceDescriptor,
    asset_id: &str,
    quote_currency: &str,
) -> Box<dyn PriceSource> {
    match provider {
        Provider::CoinGecko => Box::new(CoinGeckoSource::new(
            client,
            descriptor,
            asset_id,
            quote_currency,
        )),
        Provider::Coinbase => Box::new(CoinbaseSource::new(client, descriptor)),
        Provider::Bitstamp => Box::new(BitstampSource::new(client, descriptor)),
        Provider::Kraken => Box::new(KrakenSource::new(client, descriptor)),
        Provider::Bitfinex => Box::new(BitfinexSource::new(client, descriptor)),
    }
}
