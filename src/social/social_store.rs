use super::models::{NewPost, Post};
use anyhow::Result;

/// Outcome of a like toggle: the new count and whether the toggling
/// user is now in the liking set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikeToggle {
    pub likes: usize,
    pub liked: bool,
}

pub trait SocialStore: Send + Sync {
    /// Creates a new post and returns its id.
    fn create_post(&self, post: &NewPost) -> Result<String>;

    /// Returns a post with its likes.
    /// Returns Ok(None) if the post does not exist.
    /// Returns Err if there is a database error.
    fn get_post(&self, post_id: &str) -> Result<Option<Post>>;

    /// Returns the most recent posts across all users, newest first.
    fn recent_posts(&self, limit: usize) -> Result<Vec<Post>>;

    /// Returns all posts by a user, newest first.
    fn posts_by_user(&self, user_id: usize) -> Result<Vec<Post>>;

    /// Flips the like state of a post for a user and returns the new
    /// like count and state. Returns Ok(None) if the post does not exist.
    fn toggle_like(&self, post_id: &str, user_id: usize) -> Result<Option<LikeToggle>>;

    /// Flips the follow state between two users. Returns the new state,
    /// true when the follower now follows the followed user.
    fn toggle_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool>;

    /// Returns true when follower currently follows followed.
    fn is_following(&self, follower_id: usize, followed_id: usize) -> Result<bool>;

    /// Returns how many users follow the given user.
    fn follower_count(&self, user_id: usize) -> Result<usize>;

    /// Returns how many posts the given user has published.
    fn post_count(&self, user_id: usize) -> Result<usize>;
}
