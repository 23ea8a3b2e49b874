//! External data collaborators
//!
//! Each collaborator is a trait so the prediction pipeline can be driven by
//! the real HTTP clients in production and by in-memory doubles in tests:
//! - [`DirectorySearch`]: restaurant listings for a location (Yelp Fusion)
//! - [`PlaceReviews`]: review bodies for a named listing (Google Places)
//! - [`TrendSource`]: a search-interest time series for a term (Google Trends)

use async_trait::async_trait;

use crate::Result;
use crate::models::BusinessListing;

pub mod google_places;
pub mod google_trends;
pub mod yelp;

pub use google_places::GooglePlacesClient;
pub use google_trends::GoogleTrendsClient;
pub use yelp::YelpClient;

/// Business directory lookup
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Listings for the configured search term in `location`
    async fn search(&self, location: &str) -> Result<Vec<BusinessListing>>;
}

/// Review text lookup for a single listing
#[async_trait]
pub trait PlaceReviews: Send + Sync {
    /// Review bodies of the best place match for `listing_name` in `location`
    async fn reviews(&self, listing_name: &str, location: &str) -> Result<Vec<String>>;
}

/// Search-interest time series
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Interest values over the configured window, oldest first
    async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>>;
}
