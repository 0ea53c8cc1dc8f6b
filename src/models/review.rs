// src/models/review.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A published review as the record store returns it. Field names keep the
/// backend's wire spelling, which mixes camelCase and snake_case.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    #[serde(rename = "_id", default)]
    pub id: String, // Store-assigned ID; empty only inside payload echoes
    #[serde(rename = "foodName")]
    pub food_name: String,
    #[serde(rename = "restaurantName")]
    pub restaurant_name: String,
    pub location: String,
    #[serde(rename = "foodImage", default)]
    pub food_image: String, // Hosted URL, or "" when no photo was attached
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: f64, // [1.0, 5.0] in 0.5 steps
    #[serde(rename = "shortReview")]
    pub short_review: String,
    #[serde(rename = "detailedReview")]
    pub detailed_review: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_photo: String,
    pub created_at: DateTime<Utc>, // Client-assigned at submission time
}

/// The deployed backend returns ratings both as JSON numbers and as strings
/// ("4.5"), depending on how the record was written. Accept either.
pub(crate) fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(f64),
        Text(String),
    }

    match RawRating::deserialize(deserializer)? {
        RawRating::Number(value) => Ok(value),
        RawRating::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("unparseable rating: {text:?}"))),
    }
}

/// Create payload: every field the store persists, including the author
/// identity stamped from the session and the fresh timestamp.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewReview {
    #[serde(rename = "foodName")]
    pub food_name: String,
    #[serde(rename = "restaurantName")]
    pub restaurant_name: String,
    pub location: String,
    #[serde(rename = "foodImage")]
    pub food_image: String,
    pub rating: f64,
    #[serde(rename = "shortReview")]
    pub short_review: String,
    #[serde(rename = "detailedReview")]
    pub detailed_review: String,
    pub user_email: String,
    pub user_name: String,
    pub user_photo: String,
    pub created_at: DateTime<Utc>,
}

/// Update payload: only the editable fields. The author identity and the
/// original timestamp are never re-stamped on edit.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReviewPatch {
    #[serde(rename = "foodName")]
    pub food_name: String,
    #[serde(rename = "restaurantName")]
    pub restaurant_name: String,
    pub location: String,
    #[serde(rename = "foodImage")]
    pub food_image: String,
    pub rating: f64,
    #[serde(rename = "shortReview")]
    pub short_review: String,
    #[serde(rename = "detailedReview")]
    pub detailed_review: String,
}

/// A raw image picked in the form, not yet hosted anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Form-side state for a review being written or edited. The rating stays a
/// raw string until validation, exactly as it leaves the input element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewDraft {
    pub food_name: String,
    pub restaurant_name: String,
    pub location: String,
    pub rating: String,
    pub short_review: String,
    pub detailed_review: String,
    pub photo: Option<ImageFile>,
    pub food_image: String, // Already-hosted URL; pre-filled on edit, "" on create
}

impl ReviewDraft {
    /// Pre-populates an edit draft from a fetched record.
    pub fn from_review(review: &Review) -> Self {
        Self {
            food_name: review.food_name.clone(),
            restaurant_name: review.restaurant_name.clone(),
            location: review.location.clone(),
            rating: review.rating.to_string(),
            short_review: review.short_review.clone(),
            detailed_review: review.detailed_review.clone(),
            photo: None,
            food_image: review.food_image.clone(),
        }
    }

    /// Back to the empty form, dropping any picked photo.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
