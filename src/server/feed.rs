//! Home feed and post handlers.

use super::error::ApiError;
use super::session::Session;
use super::state::{GuardedSocialStore, GuardedUserStore, ServerState};
use crate::social::{MediaKind, NewPost, Post};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUserView {
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(rename = "mediaType", skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    pub timestamp: String,
    pub likes: usize,
    pub liked_by: Vec<usize>,
    pub user: PostUserView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HomePostsResponse {
    posts: Vec<PostView>,
    user_id: usize,
}

#[derive(Serialize)]
struct ToggleLikeResponse {
    likes: usize,
    liked: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreatePostBody {
    content: Option<String>,
    media_url: Option<String>,
    #[serde(rename = "mediaType")]
    media_kind: Option<MediaKind>,
}

/// Resolves the author of each post so the feed can render name and
/// avatar without a second round trip.
pub fn post_views(user_store: &GuardedUserStore, posts: Vec<Post>) -> Result<Vec<PostView>, ApiError> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let user_view = match user_store.get_user(post.user_id)? {
            Some(user) => PostUserView {
                user_name: user.username,
                profile_picture: user.profile_picture,
            },
            // Author rows can outlive a user only through manual db edits.
            None => PostUserView {
                user_name: "unknown".to_string(),
                profile_picture: None,
            },
        };
        views.push(PostView {
            id: post.id,
            content: post.content,
            media_url: post.media_url,
            media_kind: post.media_kind,
            timestamp: DateTime::<Utc>::from(post.created).to_rfc3339(),
            likes: post.liked_by.len(),
            liked_by: post.liked_by,
            user: user_view,
        });
    }
    Ok(views)
}

async fn home_posts(
    session: Session,
    State(state): State<ServerState>,
) -> Result<Response, ApiError> {
    let posts = state
        .social_store
        .recent_posts(state.config.feed_page_size)?;
    let posts = post_views(&state.user_store, posts)?;
    Ok(Json(HomePostsResponse {
        posts,
        user_id: session.user_id,
    })
    .into_response())
}

async fn create_post(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<CreatePostBody>,
) -> Result<Response, ApiError> {
    if body.content.is_none() && body.media_url.is_none() {
        return Err(ApiError::BadRequest(
            "A post needs either content or media".to_string(),
        ));
    }
    let post_id = state.social_store.create_post(&NewPost {
        user_id: session.user_id,
        content: body.content,
        media_url: body.media_url,
        media_kind: body.media_kind,
    })?;
    let post = state
        .social_store
        .get_post(&post_id)?
        .ok_or(ApiError::NotFound)?;
    let mut views = post_views(&state.user_store, vec![post])?;
    let view = views.remove(0);
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

async fn toggle_like(
    session: Session,
    State(social_store): State<GuardedSocialStore>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    match social_store.toggle_like(&post_id, session.user_id)? {
        Some(toggle) => Ok(Json(ToggleLikeResponse {
            likes: toggle.likes,
            liked: toggle.liked,
        })
        .into_response()),
        None => Err(ApiError::NotFound),
    }
}

pub fn make_feed_routes(state: ServerState) -> (axum::Router, axum::Router) {
    use axum::routing::{get, post};

    let student_routes = axum::Router::new()
        .route("/homeposts", get(home_posts))
        .with_state(state.clone());

    let post_routes = axum::Router::new()
        .route("/", post(create_post))
        .route("/{post_id}/toggle-like", post(toggle_like))
        .with_state(state);

    (student_routes, post_routes)
}
