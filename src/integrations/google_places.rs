use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::PlaceReviews;
use crate::config::PlacesConfig;
use crate::http::{build_client, ensure_success};
use crate::{DishcastError, Result};

const SERVICE: &str = "google places";

/// Google Places text search + details client
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSummary>,
}

#[derive(Debug, Deserialize)]
struct PlaceSummary {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

#[derive(Debug, Deserialize)]
struct PlaceReview {
    #[serde(default)]
    text: String,
}

/// `ZERO_RESULTS` is a valid empty answer; every other non-OK status is an error
fn check_status(status: &str, error_message: Option<&str>) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(DishcastError::api(
            SERVICE,
            format!("{other}: {}", error_message.unwrap_or("no error message")),
        )),
    }
}

impl GooglePlacesClient {
    /// Create a new client
    pub fn new(config: &PlacesConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds)?,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        response
            .json()
            .await
            .map_err(|e| DishcastError::parse(SERVICE, e.to_string()))
    }

    /// Place id of the best text-search match
    async fn find_place(&self, query: &str) -> Result<Option<String>> {
        let search: TextSearchResponse = self
            .get_json("textsearch/json", &[("query", query), ("type", "restaurant")])
            .await?;
        check_status(&search.status, search.error_message.as_deref())?;
        Ok(search.results.into_iter().next().map(|place| place.place_id))
    }

    async fn place_reviews(&self, place_id: &str) -> Result<Vec<String>> {
        let details: DetailsResponse = self
            .get_json(
                "details/json",
                &[("place_id", place_id), ("fields", "reviews")],
            )
            .await?;
        check_status(&details.status, details.error_message.as_deref())?;
        Ok(extract_reviews(details))
    }
}

fn extract_reviews(details: DetailsResponse) -> Vec<String> {
    details
        .result
        .map(|result| {
            result
                .reviews
                .into_iter()
                .map(|review| review.text)
                .filter(|text| !text.trim().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl PlaceReviews for GooglePlacesClient {
    #[instrument(name = "places_reviews", skip(self))]
    async fn reviews(&self, listing_name: &str, location: &str) -> Result<Vec<String>> {
        let query = format!("{listing_name} in {location}");
        let Some(place_id) = self.find_place(&query).await? else {
            debug!("No place found for '{}'", query);
            return Ok(Vec::new());
        };

        let reviews = self.place_reviews(&place_id).await?;
        debug!("Fetched {} reviews for '{}'", reviews.len(), listing_name);
        Ok(reviews)
    }
}
