//! Data models for the dishcast service
//!
//! - Location: raw and canonical location strings
//! - Listing: directory listings and their review sets
//! - Dish: trend scores, economic profile and scored candidates
//! - Timeframe: planning horizon chosen by the user

pub mod dish;
pub mod listing;
pub mod location;
pub mod timeframe;

pub use dish::{DishCandidate, EconomicProfile, TrendScore};
pub use listing::{BusinessListing, ReviewSet};
pub use location::{LocationQuery, NormalizationSource};
pub use timeframe::Timeframe;
