//! Business listings and their aggregated reviews

use serde::{Deserialize, Serialize};

/// A restaurant as reported by the business directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessListing {
    /// Directory identifier
    pub id: String,
    pub name: String,
    /// Star rating (0.0-5.0)
    pub rating: Option<f64>,
    /// Single-line display address
    pub address: Option<String>,
    /// Price tier as shown by the directory ("$" .. "$$$$")
    pub price: Option<String>,
    /// Number of reviews the directory knows about
    pub review_count: Option<u32>,
}

/// Review bodies collected for one listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSet {
    /// Name of the listing the reviews belong to
    pub listing: String,
    /// Review texts in the order the places service returned them
    pub reviews: Vec<String>,
}

impl ReviewSet {
    #[must_use]
    pub fn new(listing: impl Into<String>, reviews: Vec<String>) -> Self {
        Self {
            listing: listing.into(),
            reviews,
        }
    }

    /// Number of review texts in this set
    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
