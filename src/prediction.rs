//! Hot-dish prediction service
//!
//! Runs one request through the whole pipeline: normalize the location,
//! enrich it from the external collaborators, score the candidate dishes,
//! keep the best three and attach framework analysis to each.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analysis::{AnalysisContext, AnalysisMode, Analyst, DishAnalysis};
use crate::cache::Cache;
use crate::config::DishcastConfig;
use crate::enrichment::{Enricher, Enrichment, EnrichmentLimits, SourceFailure};
use crate::integrations::{
    DirectorySearch, GooglePlacesClient, GoogleTrendsClient, PlaceReviews, TrendSource, YelpClient,
};
use crate::llm::{CompletionProvider, OpenAiClient};
use crate::models::{
    BusinessListing, DishCandidate, EconomicProfile, LocationQuery, Timeframe, TrendScore,
};
use crate::normalizer::LocationNormalizer;
use crate::scoring::{Ranking, TOP_N, inputs_for, score_candidate};
use crate::sentiment::SentimentScorer;
use crate::{DishcastError, Result};

/// Form input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    pub location: Option<String>,
    pub dish: Option<String>,
    pub timeframe: Timeframe,
    pub analysis: AnalysisMode,
}

/// A ranked dish with its analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDish {
    #[serde(flatten)]
    pub candidate: DishCandidate,
    /// Trend as displayed: one decimal, or "N/A" when the lookup failed
    pub trend_label: String,
    pub analysis: DishAnalysis,
}

/// Everything rendered for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub location: Option<LocationQuery>,
    pub timeframe: Timeframe,
    pub analysis_mode: AnalysisMode,
    pub listings: Vec<BusinessListing>,
    pub top: Vec<RankedDish>,
    pub warnings: Vec<String>,
    pub failures: Vec<SourceFailure>,
    pub generated_at: DateTime<Utc>,
}

/// The external collaborators the pipeline talks to
pub struct Collaborators {
    pub llm: Arc<dyn CompletionProvider>,
    pub directory: Arc<dyn DirectorySearch>,
    pub reviews: Arc<dyn PlaceReviews>,
    pub trends: Arc<dyn TrendSource>,
}

impl Collaborators {
    /// Build the production HTTP clients. Fails when any credential is missing.
    pub fn from_config(config: &DishcastConfig) -> Result<Self> {
        let credentials = config.credentials.require()?;
        Ok(Self {
            llm: Arc::new(OpenAiClient::new(&config.llm, credentials.openai_api_key)?),
            directory: Arc::new(YelpClient::new(&config.directory, credentials.yelp_api_key)?),
            reviews: Arc::new(GooglePlacesClient::new(
                &config.places,
                credentials.google_api_key,
            )?),
            trends: Arc::new(GoogleTrendsClient::new(&config.trends)?),
        })
    }
}

/// Non-collaborator settings of the pipeline
#[derive(Debug, Clone)]
pub struct PredictionSettings {
    /// Dishes scored for every request
    pub candidates: Vec<String>,
    pub limits: EnrichmentLimits,
}

impl PredictionSettings {
    #[must_use]
    pub fn from_config(config: &DishcastConfig) -> Self {
        Self {
            candidates: config.trends.candidates.clone(),
            limits: EnrichmentLimits {
                max_review_listings: config.places.max_listings as usize,
                max_reviews_per_listing: config.places.max_reviews_per_listing as usize,
            },
        }
    }
}

pub struct PredictionService {
    normalizer: LocationNormalizer,
    enricher: Enricher,
    sentiment: SentimentScorer,
    analyst: Analyst,
    candidates: Vec<String>,
}

impl PredictionService {
    pub fn new(
        collaborators: Collaborators,
        settings: PredictionSettings,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        let Collaborators {
            llm,
            directory,
            reviews,
            trends,
        } = collaborators;

        Self {
            normalizer: LocationNormalizer::new(llm.clone(), cache.clone()),
            enricher: Enricher::new(directory, reviews, trends, cache, settings.limits),
            sentiment: SentimentScorer::new(llm.clone()),
            analyst: Analyst::new(llm),
            candidates: settings.candidates,
        }
    }

    /// Wire the service from configuration
    pub fn from_config(config: &DishcastConfig) -> Result<Self> {
        let collaborators = Collaborators::from_config(config)?;
        let cache = Cache::from_config(&config.cache)?.map(Arc::new);
        Ok(Self::new(
            collaborators,
            PredictionSettings::from_config(config),
            cache,
        ))
    }

    /// Run the full pipeline for one request
    #[instrument(skip(self, request), fields(location = ?request.location, dish = ?request.dish))]
    pub async fn predict(&self, request: PredictionRequest) -> Result<PredictionReport> {
        let location = non_empty(request.location.as_deref());
        let dish = non_empty(request.dish.as_deref());

        if location.is_none() && dish.is_none() {
            return Err(DishcastError::validation("please enter a location or a dish"));
        }

        let mut candidates = self.candidates.clone();
        if let Some(dish) = dish {
            if !candidates.iter().any(|c| c == dish) {
                candidates.push(dish.to_string());
            }
        }

        let mut warnings = Vec::new();
        let (query, enrichment, ranked) = match location {
            Some(raw) => {
                let query = self.normalizer.normalize(raw).await;
                warnings.extend(query.warning());

                let enrichment = self.enricher.enrich(&query.canonical, &candidates).await;
                let ranked = self.rank(&query.canonical, &candidates, &enrichment).await;
                if ranked.is_empty() {
                    warnings.push(format!(
                        "No reviews were found for {}, so no dishes could be ranked",
                        query.canonical
                    ));
                }
                (Some(query), enrichment, ranked)
            }
            None => {
                let dish = dish.unwrap_or_default();
                let economy = EconomicProfile::for_location("");
                let candidate = score_candidate(dish, &inputs_for(0.0, 0.0, &economy, 0));
                (None, Enrichment::default(), vec![candidate])
            }
        };

        for failure in &enrichment.failures {
            warnings.push(format!("{} unavailable: {}", failure.source, failure.reason));
        }

        let canonical = query.as_ref().map(|q| q.canonical.as_str()).unwrap_or_default();
        let economy = EconomicProfile::for_location(canonical);
        let mut top = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let context = AnalysisContext {
                dish: &candidate,
                economy: &economy,
                location: canonical,
                timeframe: request.timeframe,
            };
            let analysis = self.analyst.analyze(&context, request.analysis).await;
            let trend_label = if query.is_some() {
                enrichment.trend_for(&candidate.name).to_string()
            } else {
                TrendScore::unavailable(&candidate.name).to_string()
            };
            top.push(RankedDish {
                candidate,
                trend_label,
                analysis,
            });
        }

        info!(
            top = top.len(),
            warnings = warnings.len(),
            "Prediction finished"
        );

        Ok(PredictionReport {
            location: query,
            timeframe: request.timeframe,
            analysis_mode: request.analysis,
            listings: enrichment.listings,
            top,
            warnings,
            failures: enrichment.failures,
            generated_at: Utc::now(),
        })
    }

    /// Score every (review set, candidate) pair and keep the best three.
    /// Review sets are processed in listing order, so a dish's surviving
    /// score is the one computed from the last review set.
    async fn rank(
        &self,
        location: &str,
        candidates: &[String],
        enrichment: &Enrichment,
    ) -> Vec<DishCandidate> {
        let economy = EconomicProfile::for_location(location);
        let mut ranking = Ranking::new();

        for set in &enrichment.review_sets {
            let sentiment = self.sentiment.score(&set.reviews).await;
            for dish in candidates {
                let trend = enrichment.trend_for(dish).value_or_zero();
                ranking.score(dish, &inputs_for(sentiment, trend, &economy, set.len()));
            }
        }

        ranking.top(TOP_N)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
