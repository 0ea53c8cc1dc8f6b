//! Savorly client core: the review data pipeline and client-side
//! consistency engine behind the community food-review platform.
//!
//! The crate is UI-free. A host page constructs a [`ReviewEngine`] from a
//! record store, an asset uploader and the active session, then drives
//! everything through it: cache-backed reads, the review submission
//! workflow, favorites, debounced search with pagination, and the profile
//! dashboard.

pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod models;
#[cfg(target_arch = "wasm32")]
pub mod net;
pub mod search;
pub mod session;
pub mod utils;
pub mod workflow;

pub use cache::QueryCache;
pub use config::ClientConfig;
pub use engine::ReviewEngine;
pub use error::{GatewayError, SubmitError};
pub use session::Session;
