//! The client's one entry point: cache-backed reads, write operations that
//! run the submission workflow, and the invalidation that ties the two
//! together. Pages hold a [`ReviewEngine`] and nothing else.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{AssetUploader, RecordStore, ReviewApi};
use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dashboard::{self, DashboardSummary, FavoritesSummary};
use crate::error::{GatewayError, SubmitError};
use crate::models::{FavoriteEntry, FavoritePayload, Review, ReviewDraft, TopUser};
use crate::session::Session;
use crate::workflow::SubmissionWorkflow;

pub struct ReviewEngine {
    api: ReviewApi,
    workflow: SubmissionWorkflow,
    cache: QueryCache,
    session: Arc<Session>,
}

impl ReviewEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        uploader: Arc<dyn AssetUploader>,
        session: Arc<Session>,
    ) -> Self {
        let api = ReviewApi::new(store);
        let workflow = SubmissionWorkflow::new(api.clone(), uploader, Arc::clone(&session));
        Self {
            api,
            workflow,
            cache: QueryCache::new(),
            session,
        }
    }

    /// The review feed for one search term, cached per term. `""` is the
    /// unfiltered feed.
    pub async fn reviews(&self, search: &str) -> Result<Vec<Review>, GatewayError> {
        let key = QueryKey::all_reviews(search);
        if let Some(hit) = self.cache.get::<Vec<Review>>(&key).await {
            debug!(search = %search, "reviews served from cache");
            return Ok(hit);
        }
        let fresh = self.api.list_reviews(search).await?;
        self.cache.put(key, &fresh).await;
        Ok(fresh)
    }

    /// The signed-in user's own reviews. Signed out, this is an empty list
    /// rather than an error; the profile page renders its zero state.
    pub async fn my_reviews(&self) -> Result<Vec<Review>, GatewayError> {
        let Some(email) = self.session.email() else {
            debug!("my reviews requested while signed out");
            return Ok(Vec::new());
        };
        let key = QueryKey::my_reviews(email.clone());
        if let Some(hit) = self.cache.get::<Vec<Review>>(&key).await {
            debug!(email = %email, "author reviews served from cache");
            return Ok(hit);
        }
        let fresh = self.api.list_my_reviews(&email).await?;
        self.cache.put(key, &fresh).await;
        Ok(fresh)
    }

    pub async fn review(&self, id: &str) -> Result<Review, GatewayError> {
        let key = QueryKey::review_detail(id);
        if let Some(hit) = self.cache.get::<Review>(&key).await {
            debug!(id = %id, "review detail served from cache");
            return Ok(hit);
        }
        let fresh = self.api.fetch_review(id).await?;
        self.cache.put(key, &fresh).await;
        Ok(fresh)
    }

    /// The signed-in user's favorites; empty when signed out, like
    /// [`Self::my_reviews`].
    pub async fn favorites(&self) -> Result<Vec<FavoriteEntry>, GatewayError> {
        let Some(email) = self.session.email() else {
            debug!("favorites requested while signed out");
            return Ok(Vec::new());
        };
        let key = QueryKey::favorites(email.clone());
        if let Some(hit) = self.cache.get::<Vec<FavoriteEntry>>(&key).await {
            debug!(email = %email, "favorites served from cache");
            return Ok(hit);
        }
        let fresh = self.api.list_favorites(&email).await?;
        self.cache.put(key, &fresh).await;
        Ok(fresh)
    }

    pub async fn top_user(&self) -> Result<TopUser, GatewayError> {
        let key = QueryKey::TopUser;
        if let Some(hit) = self.cache.get::<TopUser>(&key).await {
            debug!("top user served from cache");
            return Ok(hit);
        }
        let fresh = self.api.top_user().await?;
        self.cache.put(key, &fresh).await;
        Ok(fresh)
    }

    /// Both landing-page queries at once. Each side fails independently, so
    /// a broken top-user aggregate never blanks the feed.
    pub async fn home_snapshot(
        &self,
    ) -> (
        Result<Vec<Review>, GatewayError>,
        Result<TopUser, GatewayError>,
    ) {
        futures::join!(self.reviews(""), self.top_user())
    }

    /// Runs the full submission workflow, then evicts every cache the new
    /// review can appear in. A failed submit leaves both the draft and the
    /// cache untouched.
    pub async fn submit_review(
        &self,
        draft: &mut ReviewDraft,
    ) -> Result<Option<Review>, SubmitError> {
        let author = self.session.email().unwrap_or_default();
        let created = self.workflow.submit(draft).await?;
        let evicted = self.cache.apply(&Mutation::ReviewCreated { author }).await;
        debug!(evicted, "caches evicted after create");
        Ok(created)
    }

    pub async fn update_review(&self, id: &str, draft: &mut ReviewDraft) -> Result<(), SubmitError> {
        let author = self.session.email().unwrap_or_default();
        self.workflow.update(id, draft).await?;
        let evicted = self
            .cache
            .apply(&Mutation::ReviewUpdated {
                author,
                id: id.to_string(),
            })
            .await;
        debug!(evicted, "caches evicted after update");
        Ok(())
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), GatewayError> {
        let author = self.session.email().unwrap_or_default();
        self.api.delete_review(id).await?;
        info!(id = %id, "review deleted");
        let evicted = self
            .cache
            .apply(&Mutation::ReviewDeleted {
                author,
                id: id.to_string(),
            })
            .await;
        debug!(evicted, "caches evicted after delete");
        Ok(())
    }

    /// Fetches the record under edit and pre-fills a draft from it. Goes
    /// through [`Self::review`], so a cached detail skips the round trip.
    pub async fn edit_draft(&self, id: &str) -> Result<ReviewDraft, GatewayError> {
        let review = self.review(id).await?;
        Ok(ReviewDraft::from_review(&review))
    }

    /// Marks a review as a favorite of the signed-in user. Requires a
    /// session; the mark is meaningless without an owner.
    pub async fn add_favorite(&self, review_id: &str) -> Result<(), GatewayError> {
        let Some(user) = self.session.email() else {
            warn!("favorite rejected: no active session");
            return Err(GatewayError::Rejected("no active session".to_string()));
        };
        let payload = FavoritePayload {
            favorite_of: user.clone(),
            review_id: review_id.to_string(),
            added_at: Utc::now(),
        };
        self.api.add_favorite(&payload).await?;
        info!(review_id = %review_id, "favorite added");
        let evicted = self.cache.apply(&Mutation::FavoriteAdded { user }).await;
        debug!(evicted, "caches evicted after favorite add");
        Ok(())
    }

    pub async fn remove_favorite(&self, favorite_id: &str) -> Result<(), GatewayError> {
        let Some(user) = self.session.email() else {
            warn!("unfavorite rejected: no active session");
            return Err(GatewayError::Rejected("no active session".to_string()));
        };
        self.api.remove_favorite(favorite_id).await?;
        info!(favorite_id = %favorite_id, "favorite removed");
        let evicted = self.cache.apply(&Mutation::FavoriteRemoved { user }).await;
        debug!(evicted, "caches evicted after favorite removal");
        Ok(())
    }

    /// The profile dashboard, computed from the user's own reviews. Signed
    /// out it is all zeroes.
    pub async fn dashboard(&self) -> Result<DashboardSummary, GatewayError> {
        let mine = self.my_reviews().await?;
        Ok(dashboard::summarize(&mine))
    }

    pub async fn favorites_dashboard(&self) -> Result<FavoritesSummary, GatewayError> {
        let favorites = self.favorites().await?;
        Ok(dashboard::summarize_favorites(&favorites))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}
