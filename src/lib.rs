/*
 * Quorum - multi-source reference price aggregation
 * Core library exports and module declarations
 */

pub mod analytics;
pub mod cex;
pub mod config;
pub mod fx;
pub mod models;
pub mod orchestrator;
pub mod service;
pub mod utils;

pub use config::Config;
pub use models::*;
pub use service::QuoteService;
