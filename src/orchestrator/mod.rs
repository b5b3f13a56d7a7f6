/*
 * Concurrent fan-out over all configured price sources
 */

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use crate::cex::PriceSource;
use crate::models::{PriceOutcome, QuorumError, Result};

/// Queries every source concurrently and returns one outcome per source.
///
/// Each source runs on its own task bounded by its own timeout; a slow or
/// failing source never cancels its siblings. The call returns only after
/// every task has finished, so the result always has `sources.len()`
/// entries in completion order.
pub async fn fetch_all(sources: &[Arc<dyn PriceSource>]) -> Vec<PriceOutcome> {
    let (tx, mut rx) = mpsc::channel::<PriceOutcome>(sources.len().max(1));

    let handles: Vec<(String, JoinHandle<()>)> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            let tx = tx.clone();
            let name = source.name().to_string();
            let handle = tokio::spawn(async move {
                let outcome = PriceOutcome::new(source.name(), fetch_bounded(source.as_ref()).await);
                log_outcome(&outcome);
                // Capacity equals the task count, so this never waits.
                let _ = tx.send(outcome).await;
            });
            (name, handle)
        })
        .collect();
    drop(tx);

    let mut outcomes = Vec::with_capacity(sources.len());
    for (name, handle) in handles {
        if let Err(e) = handle.await {
            warn!("[{}] fetch task aborted: {}", name, e);
            outcomes.push(PriceOutcome::failure(
                name,
                QuorumError::TaskAborted(e.to_string()),
            ));
        }
    }

    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }

    info!(
        "Collected {} outcomes ({} successful)",
        outcomes.len(),
        outcomes.iter().filter(|o| o.is_success()).count()
    );
    outcomes
}

async fn fetch_bounded(source: &dyn PriceSource) -> Result<f64> {
    let limit = source.timeout();
    match tokio::time::timeout(limit, source.fetch_price()).await {
        Ok(result) => result,
        Err(_) => Err(QuorumError::NetworkError(format!(
            "{} timed out after {:?}",
            source.name(),
            limit
        ))),
    }
}

fn log_outcome(outcome: &PriceOutcome) {
    match (outcome.price(), outcome.failure_reason()) {
        (Some(price), _) => info!("[{}] price = {:.2}", outcome.source_name(), price),
        (None, Some(e)) => warn!("[{}] error: {}", outcome.source_name(), e),
        (None, None) => {}
    }
}
