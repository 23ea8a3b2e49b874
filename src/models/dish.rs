//! Dish candidates and the signals they are scored from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean search interest for one term, or `None` when the lookup failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendScore {
    pub term: String,
    pub value: Option<f64>,
}

impl TrendScore {
    /// Reduce an interest series to its mean; an empty series scores 0.0
    #[must_use]
    pub fn from_series(term: impl Into<String>, series: &[f64]) -> Self {
        let value = if series.is_empty() {
            0.0
        } else {
            series.iter().sum::<f64>() / series.len() as f64
        };
        Self {
            term: term.into(),
            value: Some(value),
        }
    }

    /// Sentinel for a term whose lookup failed
    #[must_use]
    pub fn unavailable(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            value: None,
        }
    }

    /// Value used by the composite scorer
    #[must_use]
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

impl fmt::Display for TrendScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{value:.1}"),
            None => write!(f, "N/A"),
        }
    }
}

/// Regional economic figures used by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicProfile {
    /// Median household income in USD
    pub income: f64,
    pub population: u64,
}

impl EconomicProfile {
    /// The same constant profile is returned for every location
    #[must_use]
    pub fn for_location(_location: &str) -> Self {
        Self {
            income: 80_000.0,
            population: 500_000,
        }
    }
}

/// A scored dish ready for ranking and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishCandidate {
    pub name: String,
    /// Composite score, rounded to three decimals
    pub score: f64,
    /// Sentiment component, rounded to two decimals
    pub sentiment: f64,
    /// Trend component, rounded to two decimals
    pub trend: f64,
}
