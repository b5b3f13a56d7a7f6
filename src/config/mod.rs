/*
 * Configuration management for the quorum pipeline
 */

use crate::models::{QuorumError, Result, SourceDescriptor};
use reqwest::Url;
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Asset and quote currency the built-in exchange tickers are fixed to.
const EXCHANGE_ASSET_ID: &str = "ethereum";
const EXCHANGE_QUOTE_CURRENCY: &str = "usd";

#[derive(Debug, Clone)]
pub struct Config {
    pub asset: AssetConfig,
    pub sources: Vec<SourceConfig>,
    pub rate: RateConfig,
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// CoinGecko asset id, used both for the CoinGecko source and the rate lookup.
    pub asset_id: String,
    pub quote_currency: String,
    pub target_currency: String,
}

impl AssetConfig {
    fn is_exchange_pair(&self) -> bool {
        self.asset_id == EXCHANGE_ASSET_ID && self.quote_currency == EXCHANGE_QUOTE_CURRENCY
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub provider: Provider,
    pub descriptor: SourceDescriptor,
}

#[derive(Debug, Clone)]
pub struct RateConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    CoinGecko,
    Coinbase,
    Bitstamp,
    Kraken,
    Bitfinex,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::CoinGecko,
        Provider::Coinbase,
        Provider::Bitstamp,
        Provider::Kraken,
        Provider::Bitfinex,
    ];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::CoinGecko => "CoinGecko",
            Provider::Coinbase => "Coinbase",
            Provider::Bitstamp => "Bitstamp",
            Provider::Kraken => "Kraken",
            Provider::Bitfinex => "Bitfinex",
        }
    }

    /// Production endpoint for `asset`. CoinGecko takes the asset and quote
    /// currency as query parameters; the exchange tickers only serve ETH/USD
    /// and return `None` for any other pair.
    #[must_use]
    pub fn default_endpoint(self, asset: &AssetConfig) -> Option<String> {
        let fixed = match self {
            Provider::CoinGecko => {
                return Some(format!(
                    "{DEFAULT_RATE_URL}?ids={}&vs_currencies={}",
                    asset.asset_id, asset.quote_currency
                ))
            }
            Provider::Coinbase => "https://api.coinbase.com/v2/prices/ETH-USD/spot",
            Provider::Bitstamp => "https://www.bitstamp.net/api/v2/ticker/ethusd/",
            Provider::Kraken => "https://api.kraken.com/0/public/Ticker?pair=ETHUSD",
            Provider::Bitfinex => "https://api-pub.bitfinex.com/v2/ticker/tETHUSD",
        };
        asset.is_exchange_pair().then(|| fixed.to_string())
    }

    fn env_key(self) -> String {
        format!("QUORUM_{}_URL", self.display_name().to_uppercase())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup, with the same
    /// keys and defaults as `from_env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let asset = AssetConfig {
            asset_id: lookup("QUORUM_ASSET_ID")
                .unwrap_or_else(|| EXCHANGE_ASSET_ID.to_string())
                .to_lowercase(),
            quote_currency: lookup("QUORUM_QUOTE_CURRENCY")
                .unwrap_or_else(|| EXCHANGE_QUOTE_CURRENCY.to_string())
                .to_lowercase(),
            target_currency: lookup("QUORUM_TARGET_CURRENCY")
                .unwrap_or_else(|| "aud".to_string())
                .to_lowercase(),
        };

        let source_timeout = parse_secs(&lookup, "QUORUM_SOURCE_TIMEOUT_SECS")?;
        let providers = match lookup("QUORUM_SOURCES") {
            Some(list) => parse_provider_list(&list)?,
            None => Provider::ALL.to_vec(),
        };

        let sources = providers
            .into_iter()
            .map(|provider| -> Result<SourceConfig> {
                let raw = lookup(&provider.env_key())
                    .or_else(|| provider.default_endpoint(&asset))
                    .ok_or_else(|| {
                        QuorumError::ConfigError(format!(
                            "{} only serves {}/{} by default; set {} to quote {}/{}",
                            provider.display_name(),
                            EXCHANGE_ASSET_ID,
                            EXCHANGE_QUOTE_CURRENCY,
                            provider.env_key(),
                            asset.asset_id,
                            asset.quote_currency
                        ))
                    })?;
                Ok(SourceConfig {
                    provider,
                    descriptor: SourceDescriptor::new(
                        provider.display_name(),
                        parse_url(&raw)?,
                        source_timeout,
                    ),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Config {
            asset,
            sources,
            rate: RateConfig {
                endpoint: parse_url(
                    &lookup("QUORUM_RATE_URL").unwrap_or_else(|| DEFAULT_RATE_URL.to_string()),
                )?,
                timeout: parse_secs(&lookup, "QUORUM_RATE_TIMEOUT_SECS")?,
            },
        })
    }
}

impl std::str::FromStr for Provider {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "coingecko" => Ok(Provider::CoinGecko),
            "coinbase" => Ok(Provider::Coinbase),
            "bitstamp" => Ok(Provider::Bitstamp),
            "kraken" => Ok(Provider::Kraken),
            "bitfinex" => Ok(Provider::Bitfinex),
            _ => Err(QuorumError::ConfigError(format!(
                "Unknown price provider: {s}"
            ))),
        }
    }
}

pub fn parse_provider_list(list: &str) -> Result<Vec<Provider>> {
    let providers = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Provider>>>()?;

    if providers.is_empty() {
        return Err(QuorumError::ConfigError(
            "At least one price provider must be configured".to_string(),
        ));
    }
    Ok(providers)
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| QuorumError::ConfigError(format!("Invalid URL {raw}: {e}")))
}

/// Reads a whole-second timeout. Zero is rejected: it would fail every call.
fn parse_secs<F>(lookup: &F, key: &str) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = lookup(key)
        .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
        .trim()
        .parse()
        .map_err(|e| QuorumError::ConfigError(format!("Invalid {key}: {e}")))?;

    if secs == 0 {
        return Err(QuorumError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(Duration::from_secs(secs))
}
