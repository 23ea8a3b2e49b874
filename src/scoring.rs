//! Composite dish scoring and top-3 selection

use std::collections::HashMap;

use tracing::debug;

use crate::models::{DishCandidate, EconomicProfile};

pub const SENTIMENT_WEIGHT: f64 = 0.4;
pub const TREND_WEIGHT: f64 = 0.3;
pub const INCOME_WEIGHT: f64 = 0.2;
pub const REVIEW_VOLUME_WEIGHT: f64 = 0.1;

/// Number of candidates kept after ranking
pub const TOP_N: usize = 3;

/// Inputs of one composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub sentiment: f64,
    pub trend: f64,
    pub income: f64,
    pub review_count: usize,
}

/// `0.4*sentiment + 0.3*trend + 0.2*(income/1e5) + 0.1*min(review_count/100, 1)`
#[must_use]
pub fn composite_score(inputs: &ScoreInputs) -> f64 {
    let review_volume = (inputs.review_count as f64 / 100.0).min(1.0);
    SENTIMENT_WEIGHT * inputs.sentiment
        + TREND_WEIGHT * inputs.trend
        + INCOME_WEIGHT * (inputs.income / 1e5)
        + REVIEW_VOLUME_WEIGHT * review_volume
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Score one dish with display rounding applied
#[must_use]
pub fn score_candidate(name: &str, inputs: &ScoreInputs) -> DishCandidate {
    DishCandidate {
        name: name.to_string(),
        score: round_to(composite_score(inputs), 3),
        sentiment: round_to(inputs.sentiment, 2),
        trend: round_to(inputs.trend, 2),
    }
}

/// Collects scored candidates and ranks them
#[derive(Debug, Default)]
pub struct Ranking {
    by_name: HashMap<String, DishCandidate>,
}

impl Ranking {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate. A candidate with an already-seen name replaces the
    /// earlier one, whatever its score.
    pub fn insert(&mut self, candidate: DishCandidate) {
        if let Some(previous) = self.by_name.insert(candidate.name.clone(), candidate) {
            debug!(
                "Replaced earlier '{}' candidate (score {})",
                previous.name, previous.score
            );
        }
    }

    /// Convenience for scoring and inserting in one step
    pub fn score(&mut self, name: &str, inputs: &ScoreInputs) {
        self.insert(score_candidate(name, inputs));
    }

    /// The highest-scoring candidates, best first
    #[must_use]
    pub fn top(self, n: usize) -> Vec<DishCandidate> {
        let mut candidates: Vec<DishCandidate> = self.by_name.into_values().collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(n);
        candidates
    }
}

/// Score inputs for every candidate dish against one review set
#[must_use]
pub fn inputs_for(sentiment: f64, trend: f64, economy: &EconomicProfile, review_count: usize) -> ScoreInputs {
    ScoreInputs {
        sentiment,
        trend,
        income: economy.income,
        review_count,
    }
}
