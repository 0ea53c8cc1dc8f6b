//! The review submission workflow: validate, upload the photo if one was
//! picked, compose the record payload, then create or update through the
//! gateway.
//!
//! Steps run strictly in order and every failure is terminal for this
//! invocation: a rejected upload never reaches the record store, and a
//! rejected create leaves the draft intact for manual resubmission. A photo
//! that uploads before a rejected create stays hosted; the asset store has
//! no delete call, so the orphan is accepted.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::api::{AssetUploader, ReviewApi};
use crate::error::{DraftField, SubmitError, ValidationReport};
use crate::models::{NewReview, Review, ReviewDraft, ReviewPatch};
use crate::session::Session;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;
pub const SHORT_REVIEW_MAX_CHARS: usize = 150;
pub const DETAILED_REVIEW_MIN_CHARS: usize = 50;

pub struct SubmissionWorkflow {
    api: ReviewApi,
    uploader: Arc<dyn AssetUploader>,
    session: Arc<Session>,
}

impl SubmissionWorkflow {
    pub fn new(api: ReviewApi, uploader: Arc<dyn AssetUploader>, session: Arc<Session>) -> Self {
        Self {
            api,
            uploader,
            session,
        }
    }

    /// Creates a new review from the draft. On success the draft resets to
    /// the empty form; on any failure it is left untouched.
    pub async fn submit(&self, draft: &mut ReviewDraft) -> Result<Option<Review>, SubmitError> {
        let rating = validate(draft).map_err(SubmitError::Invalid)?;
        let food_image = self.resolve_image(draft).await?;
        let payload = self.compose(draft, rating, food_image);

        info!(food = %payload.food_name, restaurant = %payload.restaurant_name, "submitting review");
        let created = self.api.create_review(&payload).await?;
        draft.clear();
        Ok(created)
    }

    /// Edits an existing review. Same steps as [`Self::submit`] with the
    /// update endpoint as the target; the draft is not reset because the
    /// edit view navigates away on success.
    pub async fn update(&self, id: &str, draft: &mut ReviewDraft) -> Result<(), SubmitError> {
        let rating = validate(draft).map_err(SubmitError::Invalid)?;
        let food_image = self.resolve_image(draft).await?;
        let patch = ReviewPatch {
            food_name: draft.food_name.clone(),
            restaurant_name: draft.restaurant_name.clone(),
            location: draft.location.clone(),
            food_image,
            rating,
            short_review: draft.short_review.clone(),
            detailed_review: draft.detailed_review.clone(),
        };

        info!(id = %id, "updating review");
        self.api.update_review(id, &patch).await?;
        Ok(())
    }

    /// Step 1: a freshly picked photo is uploaded first; otherwise the
    /// draft's existing URL carries over ("" on create, the prior image on
    /// edit).
    async fn resolve_image(&self, draft: &ReviewDraft) -> Result<String, SubmitError> {
        match &draft.photo {
            Some(image) => {
                info!(file = %image.name, bytes = image.bytes.len(), "uploading review image");
                let url = self.uploader.upload(image).await?;
                debug!(url = %url, "image hosted");
                Ok(url)
            }
            None => Ok(draft.food_image.clone()),
        }
    }

    /// Step 2: merge the validated fields, the resolved image URL, the
    /// session identity and a fresh timestamp into the create payload.
    fn compose(&self, draft: &ReviewDraft, rating: f64, food_image: String) -> NewReview {
        let author = self.session.current().unwrap_or_default();
        NewReview {
            food_name: draft.food_name.clone(),
            restaurant_name: draft.restaurant_name.clone(),
            location: draft.location.clone(),
            food_image,
            rating,
            short_review: draft.short_review.clone(),
            detailed_review: draft.detailed_review.clone(),
            user_email: author.email,
            user_name: author.display_name,
            user_photo: author.photo_url,
            created_at: Utc::now(),
        }
    }
}

/// Checks every field and collects one message per problem, in form order.
/// Returns the parsed rating so callers never re-parse the raw string.
pub fn validate(draft: &ReviewDraft) -> Result<f64, ValidationReport> {
    let mut report = ValidationReport::new();

    if draft.food_name.trim().is_empty() {
        report.push(DraftField::FoodName, "Food name is required");
    }
    if draft.restaurant_name.trim().is_empty() {
        report.push(DraftField::RestaurantName, "Restaurant name is required");
    }
    if draft.location.trim().is_empty() {
        report.push(DraftField::Location, "Location is required");
    }

    let rating = parse_rating(&draft.rating, &mut report);

    let short = draft.short_review.trim();
    if short.is_empty() {
        report.push(DraftField::ShortReview, "Short review is required");
    } else if short.chars().count() > SHORT_REVIEW_MAX_CHARS {
        report.push(DraftField::ShortReview, "Maximum 150 characters");
    }

    let detailed = draft.detailed_review.trim();
    if detailed.is_empty() {
        report.push(DraftField::DetailedReview, "Detailed review is required");
    } else if detailed.chars().count() < DETAILED_REVIEW_MIN_CHARS {
        report.push(DraftField::DetailedReview, "Minimum 50 characters required");
    }

    match rating {
        Some(value) if report.is_empty() => Ok(value),
        _ => Err(report),
    }
}

fn parse_rating(raw: &str, report: &mut ValidationReport) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        report.push(DraftField::Rating, "Rating is required");
        return None;
    }
    let value = match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            report.push(DraftField::Rating, "Rating must be a number");
            return None;
        }
    };
    if value < RATING_MIN {
        report.push(DraftField::Rating, "Minimum rating is 1");
        return None;
    }
    if value > RATING_MAX {
        report.push(DraftField::Rating, "Maximum rating is 5");
        return None;
    }
    if (value * 2.0).fract() != 0.0 {
        report.push(DraftField::Rating, "Rating must use half-star steps");
        return None;
    }
    Some(value)
}
