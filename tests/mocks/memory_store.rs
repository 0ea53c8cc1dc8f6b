//! In-memory collaborators for integration tests: a record store speaking
//! the deployed backend's reply shapes and an uploader handing out fake
//! hosted URLs. Both journal their calls so tests can assert ordering and
//! fetch counts.
#![allow(dead_code)] // Not every test binary uses every helper.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use savorly::api::{AssetUploader, RecordStore, ReviewEnvelope, TopUserEnvelope, WriteAck};
use savorly::error::{GatewayError, UploadError};
use savorly::models::{
    FavoriteEntry, FavoritePayload, ImageFile, NewReview, Review, ReviewDraft, ReviewPatch,
    TopUser,
};

/// Call journal shared across collaborators, in arrival order.
pub type CallJournal = Rc<RefCell<Vec<String>>>;

pub fn shared_journal() -> CallJournal {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct MemoryRecordStore {
    reviews: RefCell<Vec<Review>>,
    favorites: RefCell<Vec<FavoriteEntry>>,
    captured_favorites: RefCell<Vec<FavoritePayload>>,
    top_user: RefCell<Option<TopUser>>,
    rejection: RefCell<Option<String>>,
    transport_down: Cell<bool>,
    read_delay: Cell<Option<Duration>>,
    journal: CallJournal,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::with_journal(shared_journal())
    }

    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            reviews: RefCell::new(Vec::new()),
            favorites: RefCell::new(Vec::new()),
            captured_favorites: RefCell::new(Vec::new()),
            top_user: RefCell::new(None),
            rejection: RefCell::new(None),
            transport_down: Cell::new(false),
            read_delay: Cell::new(None),
            journal,
        }
    }

    pub fn seed_reviews(&self, reviews: Vec<Review>) {
        *self.reviews.borrow_mut() = reviews;
    }

    pub fn seed_top_user(&self, top: TopUser) {
        *self.top_user.borrow_mut() = Some(top);
    }

    /// Every enveloped write from now on answers `success: false` with this
    /// message.
    pub fn reject_writes(&self, message: &str) {
        *self.rejection.borrow_mut() = Some(message.to_string());
    }

    /// Lifts an earlier [`Self::reject_writes`] so retried writes land.
    pub fn accept_writes(&self) {
        *self.rejection.borrow_mut() = None;
    }

    /// Every call from now on fails at the transport level.
    pub fn break_transport(&self) {
        self.transport_down.set(true);
    }

    /// Read endpoints stall for this long before answering; with a paused
    /// clock this lets two cold reads overlap deterministically.
    pub fn delay_reads(&self, delay: Duration) {
        self.read_delay.set(Some(delay));
    }

    pub fn calls(&self, op: &str) -> usize {
        self.journal.borrow().iter().filter(|c| *c == op).count()
    }

    pub fn stored_reviews(&self) -> Vec<Review> {
        self.reviews.borrow().clone()
    }

    pub fn captured_favorites(&self) -> Vec<FavoritePayload> {
        self.captured_favorites.borrow().clone()
    }

    fn observe(&self, op: &str) -> Result<(), GatewayError> {
        self.journal.borrow_mut().push(op.to_string());
        if self.transport_down.get() {
            return Err(GatewayError::Transport("store offline".to_string()));
        }
        Ok(())
    }

    async fn observe_read(&self, op: &str) -> Result<(), GatewayError> {
        self.observe(op)?;
        if let Some(delay) = self.read_delay.get() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn rejection_ack(&self) -> Option<WriteAck> {
        self.rejection.borrow().as_ref().map(|message| WriteAck {
            success: false,
            message: Some(message.clone()),
            review: None,
        })
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryRecordStore {
    async fn list_reviews(&self, search: &str) -> Result<Vec<Review>, GatewayError> {
        self.observe_read("list_reviews").await?;
        let needle = search.to_lowercase();
        let hits = self
            .reviews
            .borrow()
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.food_name.to_lowercase().contains(&needle)
                    || r.restaurant_name.to_lowercase().contains(&needle)
                    || r.location.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(hits)
    }

    async fn list_my_reviews(&self, email: &str) -> Result<Vec<Review>, GatewayError> {
        self.observe_read("list_my_reviews").await?;
        let hits = self
            .reviews
            .borrow()
            .iter()
            .filter(|r| r.user_email == email)
            .cloned()
            .collect();
        Ok(hits)
    }

    async fn fetch_review(&self, id: &str) -> Result<ReviewEnvelope, GatewayError> {
        self.observe_read("fetch_review").await?;
        let found = self.reviews.borrow().iter().find(|r| r.id == id).cloned();
        Ok(match found {
            Some(review) => ReviewEnvelope {
                success: true,
                review: Some(review),
                message: None,
            },
            None => ReviewEnvelope {
                success: false,
                review: None,
                message: Some("Review not found".to_string()),
            },
        })
    }

    async fn create_review(&self, payload: &NewReview) -> Result<WriteAck, GatewayError> {
        self.observe("create_review")?;
        if let Some(ack) = self.rejection_ack() {
            return Ok(ack);
        }
        let created = Review {
            id: Uuid::new_v4().to_string(),
            food_name: payload.food_name.clone(),
            restaurant_name: payload.restaurant_name.clone(),
            location: payload.location.clone(),
            food_image: payload.food_image.clone(),
            rating: payload.rating,
            short_review: payload.short_review.clone(),
            detailed_review: payload.detailed_review.clone(),
            user_email: payload.user_email.clone(),
            user_name: payload.user_name.clone(),
            user_photo: payload.user_photo.clone(),
            created_at: payload.created_at,
        };
        self.reviews.borrow_mut().push(created.clone());
        Ok(WriteAck {
            success: true,
            message: Some("Review added successfully".to_string()),
            review: Some(created),
        })
    }

    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<WriteAck, GatewayError> {
        self.observe("update_review")?;
        if let Some(ack) = self.rejection_ack() {
            return Ok(ack);
        }
        let mut reviews = self.reviews.borrow_mut();
        let Some(target) = reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(WriteAck {
                success: false,
                message: Some("Review not found".to_string()),
                review: None,
            });
        };
        target.food_name = patch.food_name.clone();
        target.restaurant_name = patch.restaurant_name.clone();
        target.location = patch.location.clone();
        target.food_image = patch.food_image.clone();
        target.rating = patch.rating;
        target.short_review = patch.short_review.clone();
        target.detailed_review = patch.detailed_review.clone();
        Ok(WriteAck {
            success: true,
            message: Some("Review updated successfully".to_string()),
            review: None,
        })
    }

    async fn delete_review(&self, id: &str) -> Result<WriteAck, GatewayError> {
        self.observe("delete_review")?;
        if let Some(ack) = self.rejection_ack() {
            return Ok(ack);
        }
        let mut reviews = self.reviews.borrow_mut();
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(if reviews.len() < before {
            WriteAck {
                success: true,
                message: Some("Review deleted successfully".to_string()),
                review: None,
            }
        } else {
            WriteAck {
                success: false,
                message: Some("Review not found".to_string()),
                review: None,
            }
        })
    }

    async fn add_favorite(&self, payload: &FavoritePayload) -> Result<WriteAck, GatewayError> {
        self.observe("add_favorite")?;
        if let Some(ack) = self.rejection_ack() {
            return Ok(ack);
        }
        self.captured_favorites.borrow_mut().push(payload.clone());
        let source = self
            .reviews
            .borrow()
            .iter()
            .find(|r| r.id == payload.review_id)
            .cloned();
        let entry = FavoriteEntry {
            id: Uuid::new_v4().to_string(),
            review_id: Some(payload.review_id.clone()),
            favorite_of: payload.favorite_of.clone(),
            added_at: Some(payload.added_at),
            food_name: source.as_ref().map(|r| r.food_name.clone()).unwrap_or_default(),
            restaurant_name: source
                .as_ref()
                .map(|r| r.restaurant_name.clone())
                .unwrap_or_default(),
            location: source.as_ref().map(|r| r.location.clone()).unwrap_or_default(),
            food_image: source
                .as_ref()
                .map(|r| r.food_image.clone())
                .unwrap_or_default(),
            rating: source.as_ref().map(|r| r.rating).unwrap_or_default(),
            short_review: source
                .as_ref()
                .map(|r| r.short_review.clone())
                .unwrap_or_default(),
        };
        self.favorites.borrow_mut().push(entry);
        Ok(WriteAck {
            success: true,
            message: Some("Added to favorites".to_string()),
            review: None,
        })
    }

    async fn remove_favorite(&self, favorite_id: &str) -> Result<WriteAck, GatewayError> {
        self.observe("remove_favorite")?;
        if let Some(ack) = self.rejection_ack() {
            return Ok(ack);
        }
        self.favorites.borrow_mut().retain(|f| f.id != favorite_id);
        Ok(WriteAck {
            success: true,
            message: Some("Removed from favorites".to_string()),
            review: None,
        })
    }

    async fn list_favorites(&self, email: &str) -> Result<Vec<FavoriteEntry>, GatewayError> {
        self.observe_read("list_favorites").await?;
        let hits = self
            .favorites
            .borrow()
            .iter()
            .filter(|f| f.favorite_of == email)
            .cloned()
            .collect();
        Ok(hits)
    }

    async fn top_user(&self) -> Result<TopUserEnvelope, GatewayError> {
        self.observe_read("top_user").await?;
        Ok(TopUserEnvelope {
            top_user: self.top_user.borrow().clone(),
            message: None,
        })
    }
}

pub struct MemoryUploader {
    uploads: RefCell<Vec<ImageFile>>,
    failure: RefCell<Option<String>>,
    journal: CallJournal,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::with_journal(shared_journal())
    }

    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            uploads: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            journal,
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.borrow_mut() = Some(message.to_string());
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.borrow().len()
    }
}

#[async_trait(?Send)]
impl AssetUploader for MemoryUploader {
    async fn upload(&self, image: &ImageFile) -> Result<String, UploadError> {
        self.journal.borrow_mut().push("upload".to_string());
        if let Some(message) = self.failure.borrow().clone() {
            return Err(UploadError(message));
        }
        self.uploads.borrow_mut().push(image.clone());
        Ok(format!("https://assets.test/{}", image.name))
    }
}

pub fn review(id: &str, food: &str, author_email: &str) -> Review {
    Review {
        id: id.to_string(),
        food_name: food.to_string(),
        restaurant_name: "Corner Cafe".to_string(),
        location: "Nairobi".to_string(),
        food_image: String::new(),
        rating: 4.0,
        short_review: "Worth the queue".to_string(),
        detailed_review: "Generous portions and the kachumbari alone justifies the visit."
            .to_string(),
        user_email: author_email.to_string(),
        user_name: "Someone".to_string(),
        user_photo: String::new(),
        created_at: Utc::now(),
    }
}

pub fn top_user(name: &str) -> TopUser {
    TopUser {
        name: name.to_string(),
        photo: String::new(),
        review_count: 12,
        average_rating: 4.2,
        favorite_restaurant: "Corner Cafe".to_string(),
    }
}

pub fn valid_draft() -> ReviewDraft {
    ReviewDraft {
        food_name: "Mandazi".to_string(),
        restaurant_name: "Morning Glory".to_string(),
        location: "Mombasa".to_string(),
        rating: "4.5".to_string(),
        short_review: "Light, barely sweet".to_string(),
        detailed_review: "Fried to order and still warm, with cardamom that lingers through the cup of chai."
            .to_string(),
        photo: None,
        food_image: String::new(),
    }
}
