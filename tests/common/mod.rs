#![allow(dead_code)]

use async_trait::async_trait;
use quorum::cex::PriceSource;
use quorum::{QuorumError, Result, SourceDescriptor};
use std::sync::Arc;
use std::time::Duration;

/// In-process source that answers after a fixed delay.
pub struct FakeSource {
    name: String,
    delay: Duration,
    timeout: Duration,
    price: Option<f64>,
}

impl FakeSource {
    pub fn ok(name: &str, price: f64, delay_ms: u64) -> Arc<dyn PriceSource> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(5),
            price: Some(price),
        })
    }

    pub fn failing(name: &str, delay_ms: u64) -> Arc<dyn PriceSource> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(5),
            price: None,
        })
    }

    /// Responds after `delay_ms` but gives up after `timeout_ms`.
    pub fn slow(name: &str, delay_ms: u64, timeout_ms: u64) -> Arc<dyn PriceSource> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_millis(timeout_ms),
            price: Some(1.0),
        })
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_price(&self) -> Result<f64> {
        tokio::time::sleep(self.delay).await;
        self.price
            .ok_or_else(|| QuorumError::NetworkError(format!("{} unreachable", self.name)))
    }
}

/// Source whose task panics instead of returning.
pub struct PanickingSource;

#[async_trait]
impl PriceSource for PanickingSource {
    fn name(&self) -> &str {
        "Panicky"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn fetch_price(&self) -> Result<f64> {
        panic!("decoder bug")
    }
}

pub fn descriptor(name: &str, url: &str) -> SourceDescriptor {
    SourceDescriptor::new(name, url.parse().unwrap(), Duration::from_secs(2))
}

/// A local URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/ticker")
}
