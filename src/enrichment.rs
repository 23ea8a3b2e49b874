//! Enrichment fan-out
//!
//! Three independent lookups feed the scorer: directory listings, review
//! texts for the first few listings, and trend scores for the candidate
//! dishes. Each lookup reports an explicit [`FetchOutcome`] so "no data" and
//! "call failed" stay distinguishable; [`Enricher::enrich`] then degrades
//! failures to empty values and keeps the reasons for the report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::Result;
use crate::cache::Cache;
use crate::integrations::{DirectorySearch, PlaceReviews, TrendSource};
use crate::models::{BusinessListing, ReviewSet, TrendScore};

/// Which lookup failed and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Result of one external lookup
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Failed(SourceFailure),
}

impl<T> FetchOutcome<T> {
    /// Wrap a collaborator result, logging failures
    pub fn from_result(source: impl Into<String>, result: Result<T>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => {
                let source = source.into();
                warn!("{} lookup failed: {}", source, e);
                FetchOutcome::Failed(SourceFailure {
                    source,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Split into the value (or `fallback` on failure) and the failure, if any
    pub fn degrade(self, fallback: impl FnOnce() -> T) -> (T, Option<SourceFailure>) {
        match self {
            FetchOutcome::Fetched(value) => (value, None),
            FetchOutcome::Failed(failure) => (fallback(), Some(failure)),
        }
    }
}

/// Limits applied by the fan-out
#[derive(Debug, Clone)]
pub struct EnrichmentLimits {
    /// Number of listings whose reviews are fetched
    pub max_review_listings: usize,
    /// Number of review texts kept per listing
    pub max_reviews_per_listing: usize,
}

impl Default for EnrichmentLimits {
    fn default() -> Self {
        Self {
            max_review_listings: 3,
            max_reviews_per_listing: 5,
        }
    }
}

/// Degraded, ready-to-score enrichment data
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub listings: Vec<BusinessListing>,
    pub review_sets: Vec<ReviewSet>,
    pub trends: Vec<TrendScore>,
    pub failures: Vec<SourceFailure>,
}

impl Enrichment {
    /// Trend score for `dish`, or the unavailable sentinel
    #[must_use]
    pub fn trend_for(&self, dish: &str) -> TrendScore {
        self.trends
            .iter()
            .find(|trend| trend.term == dish)
            .cloned()
            .unwrap_or_else(|| TrendScore::unavailable(dish))
    }
}

/// Runs the three enrichment lookups against the configured collaborators
pub struct Enricher {
    directory: Arc<dyn DirectorySearch>,
    reviews: Arc<dyn PlaceReviews>,
    trends: Arc<dyn TrendSource>,
    cache: Option<Arc<Cache>>,
    limits: EnrichmentLimits,
}

impl Enricher {
    pub fn new(
        directory: Arc<dyn DirectorySearch>,
        reviews: Arc<dyn PlaceReviews>,
        trends: Arc<dyn TrendSource>,
        cache: Option<Arc<Cache>>,
        limits: EnrichmentLimits,
    ) -> Self {
        Self {
            directory,
            reviews,
            trends,
            cache,
            limits,
        }
    }

    /// Run every lookup in sequence and degrade failures. Trend lookups are
    /// skipped when there is no review set to score them against.
    #[instrument(skip(self, candidates))]
    pub async fn enrich(&self, location: &str, candidates: &[String]) -> Enrichment {
        let mut failures = Vec::new();

        let (listings, failure) = self.search_listings(location).await.degrade(Vec::new);
        failures.extend(failure);

        let mut review_sets = Vec::new();
        for (listing, outcome) in self.aggregate_reviews(&listings, location).await {
            let (set, failure) = outcome.degrade(|| ReviewSet::new(listing.clone(), Vec::new()));
            review_sets.push(set);
            failures.extend(failure);
        }

        // Trends are only scored against review sets
        let candidates: &[String] = if review_sets.is_empty() { &[] } else { candidates };
        let mut trends = Vec::new();
        for (dish, outcome) in self.trend_scores(candidates).await {
            let (trend, failure) = outcome.degrade(|| TrendScore::unavailable(dish.clone()));
            trends.push(trend);
            failures.extend(failure);
        }

        info!(
            listings = listings.len(),
            review_sets = review_sets.len(),
            trends = trends.len(),
            failures = failures.len(),
            "Enrichment finished"
        );

        Enrichment {
            listings,
            review_sets,
            trends,
            failures,
        }
    }

    /// Directory search for the normalized location
    pub async fn search_listings(&self, location: &str) -> FetchOutcome<Vec<BusinessListing>> {
        FetchOutcome::from_result("directory", self.directory.search(location).await)
    }

    /// Review sets for the first listings, one outcome per listing, in listing order
    pub async fn aggregate_reviews(
        &self,
        listings: &[BusinessListing],
        location: &str,
    ) -> Vec<(String, FetchOutcome<ReviewSet>)> {
        let mut outcomes = Vec::new();
        for listing in listings.iter().take(self.limits.max_review_listings) {
            let result = self
                .reviews
                .reviews(&listing.name, location)
                .await
                .map(|mut texts| {
                    texts.truncate(self.limits.max_reviews_per_listing);
                    ReviewSet::new(listing.name.clone(), texts)
                });
            outcomes.push((
                listing.name.clone(),
                FetchOutcome::from_result(format!("reviews:{}", listing.name), result),
            ));
        }
        outcomes
    }

    /// Mean interest for each candidate dish, in candidate order
    pub async fn trend_scores(&self, candidates: &[String]) -> Vec<(String, FetchOutcome<TrendScore>)> {
        let mut outcomes = Vec::new();
        for dish in candidates {
            let outcome = match self.cached_trend(dish).await {
                Some(score) => FetchOutcome::Fetched(score),
                None => {
                    let result = self
                        .trends
                        .interest_over_time(dish)
                        .await
                        .map(|series| TrendScore::from_series(dish.clone(), &series));
                    if let (Ok(score), Some(cache)) = (&result, &self.cache) {
                        if let Err(e) = cache.put(&trend_key(dish), score).await {
                            warn!("Failed to cache trend score: {}", e);
                        }
                    }
                    FetchOutcome::from_result(format!("trends:{dish}"), result)
                }
            };
            outcomes.push((dish.clone(), outcome));
        }
        outcomes
    }

    async fn cached_trend(&self, dish: &str) -> Option<TrendScore> {
        let cache = self.cache.as_ref()?;
        cache.get::<TrendScore>(&trend_key(dish)).await.ok().flatten()
    }
}

fn trend_key(dish: &str) -> String {
    format!("trend:{dish}")
}
