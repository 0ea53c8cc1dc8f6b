// src/models/favorite.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::review::lenient_rating;

/// Write payload for marking a review as a favorite. Uniqueness is the record
/// store's concern; the client never deduplicates locally.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FavoritePayload {
    pub favorite_of: String, // Email of the user saving the favorite
    pub review_id: String,
    pub added_at: DateTime<Utc>,
}

/// A favorite as the store lists it: the mark plus denormalized review
/// fields for display. Older documents lack `reviewId`, in which case the
/// entry's own id stands in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FavoriteEntry {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "reviewId", default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub favorite_of: String,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(rename = "foodName", default)]
    pub food_name: String,
    #[serde(rename = "restaurantName", default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "foodImage", default)]
    pub food_image: String,
    #[serde(deserialize_with = "lenient_rating", default)]
    pub rating: f64,
    #[serde(rename = "shortReview", default)]
    pub short_review: String,
}

impl FavoriteEntry {
    /// The review this mark points at, falling back to the mark's own id for
    /// documents written before `reviewId` existed.
    pub fn review_ref(&self) -> &str {
        self.review_id.as_deref().unwrap_or(&self.id)
    }
}
