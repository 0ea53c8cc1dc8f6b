//! Keyed, TTL-less in-memory cache for fetched collections and records.
//!
//! Keys are structured (resource kind + the parameters that affect the
//! result), and every write operation maps to its affected scopes through a
//! single rule table, so "which caches does this write touch" is declared
//! once instead of being scattered across call sites. Entries carry a
//! monotonically increasing version. Caching is best-effort: codec failures
//! are logged and treated as a miss or a skipped store, never propagated.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cache key: resource kind plus every parameter that affects the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllReviews { search: String },
    MyReviews { email: String },
    ReviewDetail { id: String },
    Favorites { email: String },
    TopUser,
}

impl QueryKey {
    pub fn all_reviews(search: impl Into<String>) -> Self {
        QueryKey::AllReviews {
            search: search.into(),
        }
    }

    pub fn my_reviews(email: impl Into<String>) -> Self {
        QueryKey::MyReviews {
            email: email.into(),
        }
    }

    pub fn review_detail(id: impl Into<String>) -> Self {
        QueryKey::ReviewDetail { id: id.into() }
    }

    pub fn favorites(email: impl Into<String>) -> Self {
        QueryKey::Favorites {
            email: email.into(),
        }
    }

    /// Whether this key falls inside an eviction scope.
    pub fn matches(&self, scope: &KeyScope) -> bool {
        match (self, scope) {
            (QueryKey::AllReviews { .. }, KeyScope::AllReviews) => true,
            (QueryKey::MyReviews { email }, KeyScope::MyReviews { email: scoped }) => {
                email == scoped
            }
            (QueryKey::ReviewDetail { id }, KeyScope::ReviewDetail { id: scoped }) => id == scoped,
            (QueryKey::Favorites { email }, KeyScope::Favorites { email: scoped }) => {
                email == scoped
            }
            (QueryKey::TopUser, KeyScope::TopUser) => true,
            _ => false,
        }
    }
}

/// One eviction scope: a whole resource kind, or one parameterization of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScope {
    /// Every cached review feed, regardless of search term.
    AllReviews,
    MyReviews { email: String },
    ReviewDetail { id: String },
    Favorites { email: String },
    TopUser,
}

/// A successful write, as the invalidation table sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ReviewCreated { author: String },
    ReviewUpdated { author: String, id: String },
    ReviewDeleted { author: String, id: String },
    FavoriteAdded { user: String },
    FavoriteRemoved { user: String },
}

/// The one place that says which caches each write affects. A new or changed
/// review can match any cached search term, so review writes evict the whole
/// feed kind; they also age the server-computed top-user aggregate.
pub fn invalidation_scopes(mutation: &Mutation) -> Vec<KeyScope> {
    match mutation {
        Mutation::ReviewCreated { author } => vec![
            KeyScope::AllReviews,
            KeyScope::MyReviews {
                email: author.clone(),
            },
            KeyScope::TopUser,
        ],
        Mutation::ReviewUpdated { author, id } | Mutation::ReviewDeleted { author, id } => vec![
            KeyScope::AllReviews,
            KeyScope::MyReviews {
                email: author.clone(),
            },
            KeyScope::ReviewDetail { id: id.clone() },
            KeyScope::TopUser,
        ],
        Mutation::FavoriteAdded { user } | Mutation::FavoriteRemoved { user } => {
            vec![KeyScope::Favorites {
                email: user.clone(),
            }]
        }
    }
}

struct CacheSlot {
    value: Value,
    version: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheSlot>,
    tick: u64,
}

/// Shared cache handle. Clones refer to the same storage.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, decoded to the caller's type. A decode
    /// mismatch is logged and reported as a miss; the entry stays put.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.inner.lock().await;
        let slot = inner.entries.get(key)?;
        match serde_json::from_value(slot.value.clone()) {
            Ok(value) => {
                debug!(?key, version = slot.version, "cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(?key, %err, "cached value failed to decode, treating as miss");
                None
            }
        }
    }

    /// Stores `value` under `key`, bumping the entry version. Encoding
    /// failures skip the store; a fetch that cannot be cached must still
    /// succeed for its caller.
    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(?key, %err, "value failed to encode, not caching");
                return;
            }
        };
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let version = inner.tick;
        debug!(?key, version, "cache store");
        inner.entries.insert(
            key,
            CacheSlot {
                value: encoded,
                version,
            },
        );
    }

    pub async fn version(&self, key: &QueryKey) -> Option<u64> {
        let inner = self.inner.lock().await;
        inner.entries.get(key).map(|slot| slot.version)
    }

    /// Evicts every entry matching `scope`; returns how many went.
    pub async fn invalidate(&self, scope: &KeyScope) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.matches(scope));
        let evicted = before - inner.entries.len();
        if evicted > 0 {
            debug!(?scope, evicted, "cache invalidated");
        }
        evicted
    }

    /// Runs the rule table for a completed write.
    pub async fn apply(&self, mutation: &Mutation) -> usize {
        let mut evicted = 0;
        for scope in invalidation_scopes(mutation) {
            evicted += self.invalidate(&scope).await;
        }
        debug!(?mutation, evicted, "write applied to cache");
        evicted
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let dropped = inner.entries.len();
        inner.entries.clear();
        debug!(dropped, "cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_cache() -> QueryCache {
        let cache = QueryCache::new();
        cache
            .put(QueryKey::all_reviews(""), &vec!["feed".to_string()])
            .await;
        cache
            .put(QueryKey::all_reviews("pizza"), &vec!["p1".to_string()])
            .await;
        cache
            .put(QueryKey::all_reviews("sushi"), &vec!["s1".to_string()])
            .await;
        cache
            .put(QueryKey::my_reviews("ada@example.com"), &vec!["mine".to_string()])
            .await;
        cache
            .put(QueryKey::favorites("ada@example.com"), &vec!["fav".to_string()])
            .await;
        cache.put(QueryKey::TopUser, &"ada".to_string()).await;
        cache
    }

    #[tokio::test]
    async fn identical_keys_return_the_cached_value() {
        let cache = QueryCache::new();
        let key = QueryKey::all_reviews("pizza");
        cache.put(key.clone(), &vec![1, 2, 3]).await;

        let first: Option<Vec<i32>> = cache.get(&key).await;
        let second: Option<Vec<i32>> = cache.get(&key).await;
        assert_eq!(first, Some(vec![1, 2, 3]));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn versions_increase_monotonically() {
        let cache = QueryCache::new();
        let key = QueryKey::review_detail("r-1");

        cache.put(key.clone(), &"v1".to_string()).await;
        let first = cache.version(&key).await.unwrap();
        cache.put(key.clone(), &"v2".to_string()).await;
        let second = cache.version(&key).await.unwrap();
        cache.put(QueryKey::TopUser, &"other".to_string()).await;
        cache.put(key.clone(), &"v3".to_string()).await;
        let third = cache.version(&key).await.unwrap();

        assert!(first < second);
        assert!(second < third);
    }

    #[tokio::test]
    async fn kind_wide_invalidation_covers_every_search_term() {
        let cache = seeded_cache().await;

        let evicted = cache.invalidate(&KeyScope::AllReviews).await;
        assert_eq!(evicted, 3);
        let feed: Option<Vec<String>> = cache.get(&QueryKey::all_reviews("pizza")).await;
        assert!(feed.is_none());

        // Unrelated kinds survive.
        let mine: Option<Vec<String>> = cache.get(&QueryKey::my_reviews("ada@example.com")).await;
        assert!(mine.is_some());
        let top: Option<String> = cache.get(&QueryKey::TopUser).await;
        assert!(top.is_some());
    }

    #[tokio::test]
    async fn scoped_invalidation_spares_other_parameterizations() {
        let cache = seeded_cache().await;
        cache
            .put(QueryKey::my_reviews("grace@example.com"), &vec!["hers".to_string()])
            .await;

        let evicted = cache
            .invalidate(&KeyScope::MyReviews {
                email: "ada@example.com".to_string(),
            })
            .await;
        assert_eq!(evicted, 1);

        let hers: Option<Vec<String>> = cache.get(&QueryKey::my_reviews("grace@example.com")).await;
        assert!(hers.is_some());
    }

    #[tokio::test]
    async fn review_create_rule_touches_feed_author_and_top_user() {
        let cache = seeded_cache().await;

        let evicted = cache
            .apply(&Mutation::ReviewCreated {
                author: "ada@example.com".to_string(),
            })
            .await;
        // Three feed terms, one author list, the top-user aggregate.
        assert_eq!(evicted, 5);

        // Favorites are not a review kind and stay cached.
        let favs: Option<Vec<String>> = cache.get(&QueryKey::favorites("ada@example.com")).await;
        assert!(favs.is_some());
    }

    #[tokio::test]
    async fn favorite_rule_is_scoped_to_that_user() {
        let cache = seeded_cache().await;

        let evicted = cache
            .apply(&Mutation::FavoriteAdded {
                user: "ada@example.com".to_string(),
            })
            .await;
        assert_eq!(evicted, 1);

        // The feed caches are untouched by favorite writes.
        let feed: Option<Vec<String>> = cache.get(&QueryKey::all_reviews("pizza")).await;
        assert!(feed.is_some());
    }

    #[tokio::test]
    async fn update_rule_also_evicts_the_detail_entry() {
        let cache = seeded_cache().await;
        cache
            .put(QueryKey::review_detail("r-7"), &"detail".to_string())
            .await;
        cache
            .put(QueryKey::review_detail("r-8"), &"other detail".to_string())
            .await;

        cache
            .apply(&Mutation::ReviewUpdated {
                author: "ada@example.com".to_string(),
                id: "r-7".to_string(),
            })
            .await;

        let gone: Option<String> = cache.get(&QueryKey::review_detail("r-7")).await;
        assert!(gone.is_none());
        let kept: Option<String> = cache.get(&QueryKey::review_detail("r-8")).await;
        assert!(kept.is_some());
    }

    #[tokio::test]
    async fn decode_mismatch_reads_as_miss_without_evicting() {
        let cache = QueryCache::new();
        let key = QueryKey::TopUser;
        cache.put(key.clone(), &vec![1, 2, 3]).await;

        let wrong_shape: Option<HashMap<String, String>> = cache.get(&key).await;
        assert!(wrong_shape.is_none());

        // The entry itself is still there for a correctly-typed reader.
        let right_shape: Option<Vec<i32>> = cache.get(&key).await;
        assert_eq!(right_shape, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let cache = seeded_cache().await;
        assert!(!cache.is_empty().await);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
