pub mod favorite;
pub mod review;
pub mod user;

pub use favorite::{FavoriteEntry, FavoritePayload};
pub use review::{ImageFile, NewReview, Review, ReviewDraft, ReviewPatch};
pub use user::{TopUser, UserProfile};
