mod models;
mod social_store;
mod sqlite_social_store;

pub use models::{MediaKind, NewPost, Post};
pub use social_store::{LikeToggle, SocialStore};
pub use sqlite_social_store::SqliteSocialStore;
