// src/models/user.rs
use serde::{Deserialize, Serialize};

use super::review::lenient_rating;

/// Session identity as the identity provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

impl UserProfile {
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        photo_url: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            photo_url: photo_url.into(),
        }
    }
}

/// Server-computed "most active reviewer" aggregate shown on the home page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: String,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(rename = "averageRating", deserialize_with = "lenient_rating", default)]
    pub average_rating: f64,
    #[serde(rename = "favoriteRestaurant", default)]
    pub favorite_restaurant: String,
}
