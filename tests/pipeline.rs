mod common;

use common::FakeSource;
use mockito::Matcher;
use quorum::fx::RateConverter;
use quorum::{QuorumError, QuoteService};
use reqwest::Client;
use std::time::Duration;
use tokio_test::assert_ok;

async fn rate_server(status: usize, body: &str) -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/simple/price")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "ethereum".into()),
            Matcher::UrlEncoded("vs_currencies".into(), "usd,aud".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    (server, mock)
}

fn converter(server: &mockito::ServerGuard) -> RateConverter {
    let endpoint = format!("{}/simple/price", server.url()).parse().unwrap();
    RateConverter::new(Client::new(), endpoint, "ethereum", Duration::from_secs(2))
}

fn five_sources_three_healthy() -> Vec<std::sync::Arc<dyn quorum::cex::PriceSource>> {
    vec![
        FakeSource::ok("CoinGecko", 2990.0, 5),
        FakeSource::failing("Coinbase", 0),
        FakeSource::ok("Bitstamp", 3010.0, 15),
        FakeSource::failing("Kraken", 10),
        FakeSource::ok("Bitfinex", 3000.0, 0),
    ]
}

#[tokio::test]
async fn end_to_end_mean_and_conversion() {
    let (server, mock) = rate_server(200, r#"{"ethereum":{"usd":3000,"aud":4500}}"#).await;
    let service = assert_ok!(QuoteService::from_parts(
        five_sources_three_healthy(),
        converter(&server),
        "USD",
        "AUD"
    ));

    let reference = service.compute_converted_price().await.unwrap();

    assert_eq!(reference.aggregate.mean_price, 3000.0);
    assert_eq!(reference.aggregate.success_count, 3);
    assert_eq!(reference.aggregate.source_count, 5);
    assert_eq!(reference.rate.ratio, 1.5);
    assert_eq!(reference.price, 4500.0);
    assert_eq!(reference.currency, "aud");
    mock.assert_async().await;
}

#[tokio::test]
async fn all_sources_failing_skips_the_rate_lookup() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/simple/price")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"ethereum":{"usd":3000,"aud":4500}}"#)
        .expect(0)
        .create_async()
        .await;
    let sources = vec![FakeSource::failing("a", 0), FakeSource::failing("b", 0)];
    let service = QuoteService::from_parts(sources, converter(&server), "usd", "aud").unwrap();

    let err = service.compute_converted_price().await.unwrap_err();
    assert!(matches!(err, QuorumError::NoValidPrices { attempted: 2 }));
    mock.assert_async().await;
}

#[tokio::test]
async fn zero_target_rate_is_fatal() {
    let (server, _mock) = rate_server(200, r#"{"ethereum":{"usd":3000,"aud":0}}"#).await;
    let service =
        QuoteService::from_parts(five_sources_three_healthy(), converter(&server), "usd", "aud").unwrap();

    let err = service.compute_converted_price().await.unwrap_err();
    assert!(matches!(err, QuorumError::InvalidRateError(_)));
}

#[tokio::test]
async fn rate_endpoint_error_status_is_a_fetch_failure() {
    let (server, _mock) = rate_server(500, "oops").await;
    let result = converter(&server).fetch_rate("usd", "aud").await;
    assert!(matches!(result, Err(QuorumError::RateFetchError(_))));
}

#[tokio::test]
async fn rate_endpoint_unreachable_is_a_fetch_failure() {
    let endpoint = common::closed_port_url().parse().unwrap();
    let converter = RateConverter::new(Client::new(), endpoint, "ethereum", Duration::from_secs(2));
    let result = converter.fetch_rate("usd", "aud").await;
    assert!(matches!(result, Err(QuorumError::RateFetchError(_))));
}

#[tokio::test]
async fn service_requires_at_least_one_source() {
    let (server, _mock) = rate_server(200, "{}").await;
    let result = QuoteService::from_parts(Vec::new(), converter(&server), "usd", "aud");
    assert!(matches!(result, Err(QuorumError::ConfigError(_))));
}
