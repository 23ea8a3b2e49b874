//! `dishcast` - Hot-dish prediction for restaurant locations
//!
//! This library normalizes a user-supplied location, enriches it with
//! business listings, review sentiment and search-interest trends, ranks
//! candidate dishes by a composite score and attaches business framework
//! analysis to the winners.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod integrations;
pub mod llm;
pub mod models;
pub mod normalizer;
pub mod prediction;
pub mod scoring;
pub mod sentiment;
pub mod telemetry;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use analysis::{AnalysisMode, Analyst, DishAnalysis};
pub use cache::Cache;
pub use config::DishcastConfig;
pub use enrichment::{Enricher, Enrichment, FetchOutcome, SourceFailure};
pub use error::DishcastError;
pub use models::{DishCandidate, LocationQuery, Timeframe, TrendScore};
pub use normalizer::LocationNormalizer;
pub use prediction::{Collaborators, PredictionReport, PredictionRequest, PredictionService};
pub use sentiment::SentimentScorer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DishcastError>;
