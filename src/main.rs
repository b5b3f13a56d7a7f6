/*
 * Quorum - multi-source reference price aggregation
 * Interactive converter entry point
 */

use anyhow::Context;
use quorum::{config::Config, service::QuoteService};
use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Quorum reference price converter");

    let config = Config::from_env()
        .map_err(|e| {
            error!("Failed to load configuration: {}", e);
            e
        })
        .context("loading configuration")?;

    let service = QuoteService::new(&config)?;
    let reference = service
        .compute_converted_price()
        .await
        .context("computing reference price")?;

    let currency = reference.currency.to_uppercase();
    let asset = config.asset.asset_id.to_uppercase();
    println!("\nCurrent {asset} price in {currency}: {:.2}", reference.price);
    println!("\n=== {asset} Price Converter ===");
    println!("Enter the amount in {currency} (or 'q' to quit):");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{currency} amount: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let input = line.context("reading input")?;
        let input = input.trim();

        if input.eq_ignore_ascii_case("q") {
            println!("\nGoodbye!");
            break;
        }

        let amount: f64 = match input.parse() {
            Ok(amount) => amount,
            Err(_) => {
                println!("Invalid input. Please enter a valid number or 'q' to quit.");
                continue;
            }
        };
        if !(amount.is_finite() && amount > 0.0) {
            println!("Please enter a positive amount.");
            continue;
        }

        let units = amount / reference.price;
        println!("You can get {units:.8} {asset} for {amount:.2} {currency}");
        println!("\nEnter another amount or 'q' to quit:");
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quorum=info".into());

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
