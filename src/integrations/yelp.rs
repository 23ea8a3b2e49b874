use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::DirectorySearch;
use crate::config::DirectoryConfig;
use crate::http::{build_client, ensure_success};
use crate::models::BusinessListing;
use crate::{DishcastError, Result};

const SERVICE: &str = "yelp";

/// Yelp Fusion business search client
pub struct YelpClient {
    client: Client,
    api_key: String,
    base_url: String,
    term: String,
    limit: u32,
}

/// Search response from the Yelp Fusion API
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<YelpBusiness>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    id: String,
    name: String,
    rating: Option<f64>,
    price: Option<String>,
    review_count: Option<u32>,
    location: Option<YelpLocation>,
}

#[derive(Debug, Deserialize)]
struct YelpLocation {
    #[serde(default)]
    display_address: Vec<String>,
}

impl From<YelpBusiness> for BusinessListing {
    fn from(business: YelpBusiness) -> Self {
        let address = business
            .location
            .map(|location| location.display_address.join(", "))
            .filter(|address| !address.is_empty());

        Self {
            id: business.id,
            name: business.name,
            rating: business.rating,
            address,
            price: business.price,
            review_count: business.review_count,
        }
    }
}

impl YelpClient {
    /// Create a new client
    pub fn new(config: &DirectoryConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds)?,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            term: config.term.clone(),
            limit: config.limit,
        })
    }
}

#[async_trait]
impl DirectorySearch for YelpClient {
    #[instrument(name = "yelp_search", skip(self))]
    async fn search(&self, location: &str) -> Result<Vec<BusinessListing>> {
        let url = format!("{}/businesses/search", self.base_url);
        let limit = self.limit.to_string();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("term", self.term.as_str()),
                ("location", location),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| DishcastError::parse(SERVICE, e.to_string()))?;

        let listings: Vec<BusinessListing> =
            search.businesses.into_iter().map(BusinessListing::from).collect();

        info!("Found {} listings in {}", listings.len(), location);
        Ok(listings)
    }
}
