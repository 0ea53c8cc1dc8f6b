//! Collaborator contracts and the typed gateway façade.
//!
//! `RecordStore` is the transport seam: it moves JSON bodies and reports
//! transport-level failures, nothing else. `ReviewApi` interprets the store's
//! reply protocol (writes and the single-review read carry an authoritative
//! `success` flag separate from HTTP status, the remaining reads are judged
//! by the payload they carry) and turns it into domain results. Route paths live here too so they can be exercised
//! natively, away from any browser transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GatewayError, UploadError};
use crate::models::{
    FavoriteEntry, FavoritePayload, ImageFile, NewReview, Review, ReviewPatch, TopUser,
};

/// Reply envelope for every write operation. The body-level `success` flag is
/// authoritative; `review` is only populated by the create endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct WriteAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub review: Option<Review>,
}

/// Reply envelope for the single-review read. As with [`WriteAck`], the
/// `success` flag is authoritative.
#[derive(Deserialize, Debug, Clone)]
pub struct ReviewEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub review: Option<Review>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply envelope for the top-user aggregate.
#[derive(Deserialize, Debug, Clone)]
pub struct TopUserEnvelope {
    #[serde(rename = "topUser", default)]
    pub top_user: Option<TopUser>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Record-store transport. Implementations move bytes and decode shapes;
/// they must not interpret the success protocol.
#[async_trait(?Send)]
pub trait RecordStore {
    async fn list_reviews(&self, search: &str) -> Result<Vec<Review>, GatewayError>;
    async fn list_my_reviews(&self, email: &str) -> Result<Vec<Review>, GatewayError>;
    async fn fetch_review(&self, id: &str) -> Result<ReviewEnvelope, GatewayError>;
    async fn create_review(&self, payload: &NewReview) -> Result<WriteAck, GatewayError>;
    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<WriteAck, GatewayError>;
    async fn delete_review(&self, id: &str) -> Result<WriteAck, GatewayError>;
    async fn add_favorite(&self, payload: &FavoritePayload) -> Result<WriteAck, GatewayError>;
    async fn remove_favorite(&self, favorite_id: &str) -> Result<WriteAck, GatewayError>;
    async fn list_favorites(&self, email: &str) -> Result<Vec<FavoriteEntry>, GatewayError>;
    async fn top_user(&self) -> Result<TopUserEnvelope, GatewayError>;
}

/// Asset store seam: hand in raw bytes, get back a durable URL. Any failure
/// is terminal for the caller; there is no retry here.
#[async_trait(?Send)]
pub trait AssetUploader {
    async fn upload(&self, image: &ImageFile) -> Result<String, UploadError>;
}

/// Route paths of the record store, relative to the configured API base.
pub mod routes {
    pub fn reviews(search: &str) -> String {
        format!("/reviews?search={}", urlencoding::encode(search))
    }

    pub fn my_reviews(email: &str) -> String {
        format!("/my-reviews/{}", urlencoding::encode(email))
    }

    pub fn review(id: &str) -> String {
        format!("/user-review/{}", urlencoding::encode(id))
    }

    pub fn create_review() -> String {
        "/insert-new-review".to_string()
    }

    pub fn update_review(id: &str) -> String {
        format!("/edit-user-review/{}", urlencoding::encode(id))
    }

    pub fn delete_review(id: &str) -> String {
        format!("/delete-user-review/{}", urlencoding::encode(id))
    }

    pub fn add_favorite() -> String {
        "/add-to-favorite".to_string()
    }

    pub fn remove_favorite(favorite_id: &str) -> String {
        format!("/remove-favorite/{}", urlencoding::encode(favorite_id))
    }

    pub fn favorites(email: &str) -> String {
        format!("/get-favorite?email={}", urlencoding::encode(email))
    }

    pub fn top_user() -> String {
        "/top-user".to_string()
    }
}

/// Typed façade over a [`RecordStore`]: applies the reply protocol and logs
/// the operational outcome of every call.
#[derive(Clone)]
pub struct ReviewApi {
    store: Arc<dyn RecordStore>,
}

impl ReviewApi {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_reviews(&self, search: &str) -> Result<Vec<Review>, GatewayError> {
        let reviews = self.store.list_reviews(search).await?;
        debug!(search = %search, count = reviews.len(), "listed reviews");
        Ok(reviews)
    }

    pub async fn list_my_reviews(&self, email: &str) -> Result<Vec<Review>, GatewayError> {
        let reviews = self.store.list_my_reviews(email).await?;
        debug!(email = %email, count = reviews.len(), "listed author reviews");
        Ok(reviews)
    }

    pub async fn fetch_review(&self, id: &str) -> Result<Review, GatewayError> {
        let envelope = self.store.fetch_review(id).await?;
        unpack(envelope).map_err(|err| {
            warn!(id = %id, %err, "review fetch rejected");
            err
        })
    }

    pub async fn create_review(&self, payload: &NewReview) -> Result<Option<Review>, GatewayError> {
        let ack = self.store.create_review(payload).await?;
        accept(ack, "create review", "Failed to submit review").map(|ack| ack.review)
    }

    pub async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<(), GatewayError> {
        let ack = self.store.update_review(id, patch).await?;
        accept(ack, "update review", "Failed to update review").map(|_| ())
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), GatewayError> {
        let ack = self.store.delete_review(id).await?;
        accept(ack, "delete review", "Failed to delete review").map(|_| ())
    }

    pub async fn add_favorite(&self, payload: &FavoritePayload) -> Result<(), GatewayError> {
        let ack = self.store.add_favorite(payload).await?;
        accept(ack, "add favorite", "Failed to add favorite").map(|_| ())
    }

    pub async fn remove_favorite(&self, favorite_id: &str) -> Result<(), GatewayError> {
        let ack = self.store.remove_favorite(favorite_id).await?;
        accept(ack, "remove favorite", "Failed to remove favorite").map(|_| ())
    }

    pub async fn list_favorites(&self, email: &str) -> Result<Vec<FavoriteEntry>, GatewayError> {
        let favorites = self.store.list_favorites(email).await?;
        debug!(email = %email, count = favorites.len(), "listed favorites");
        Ok(favorites)
    }

    pub async fn top_user(&self) -> Result<TopUser, GatewayError> {
        let envelope = self.store.top_user().await?;
        envelope.top_user.ok_or_else(|| {
            let message = envelope
                .message
                .unwrap_or_else(|| "Top user unavailable".to_string());
            warn!(%message, "top user fetch rejected");
            GatewayError::Rejected(message)
        })
    }
}

/// Applies the success-flag protocol to the single-review reply. The flag
/// outranks the payload: a `success: false` body is a rejection even when it
/// still carries a review.
fn unpack(envelope: ReviewEnvelope) -> Result<Review, GatewayError> {
    match envelope.review {
        Some(review) if envelope.success => Ok(review),
        _ => {
            let message = envelope
                .message
                .unwrap_or_else(|| "Review not found".to_string());
            Err(GatewayError::Rejected(message))
        }
    }
}

/// Applies the success-flag protocol to a write reply. The server message is
/// surfaced verbatim; the fallback only fills in when the body omits one.
fn accept(ack: WriteAck, op: &str, fallback: &str) -> Result<WriteAck, GatewayError> {
    if ack.success {
        debug!(op = %op, "write accepted");
        Ok(ack)
    } else {
        let message = ack.message.unwrap_or_else(|| fallback.to_string());
        warn!(op = %op, %message, "write rejected");
        Err(GatewayError::Rejected(message))
    }
}
