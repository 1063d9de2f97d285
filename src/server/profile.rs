//! Profile aggregation and follow handlers.

use super::error::ApiError;
use super::feed::{post_views, PostView};
use super::session::Session;
use super::state::ServerState;
use crate::user::{Location, RoleProfile, User};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Flat profile shape the frontend renders. Role specific fields stay
/// absent instead of null for the roles they do not apply to.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    user_name: String,
    role: crate::user::UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    follower_count: usize,
    number_of_posts: usize,
    /// Whether the requesting user follows this profile.
    following: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    art_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    specialisation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    institution_name: Option<String>,
    #[serde(rename = "registrationID", skip_serializing_if = "Option::is_none")]
    registration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expertise: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

#[derive(Serialize)]
struct ProfileResponse {
    profile: ProfileView,
    posts: Vec<PostView>,
}

#[derive(Serialize)]
struct ToggleFollowResponse {
    following: bool,
}

impl ProfileView {
    fn new(user: &User, follower_count: usize, number_of_posts: usize, following: bool) -> Self {
        ProfileView {
            user_name: user.username.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
            description: user.description.clone(),
            follower_count,
            number_of_posts,
            following,
            art_form: None,
            specialisation: None,
            institution_name: None,
            registration_id: None,
            owner_name: None,
            expertise: None,
            address: None,
            postal_code: None,
            district: None,
            state: None,
            country: None,
        }
    }

    fn set_location(&mut self, location: Location) {
        self.address = location.address;
        self.postal_code = Some(location.postal_code);
        self.district = location.district;
        self.state = location.state;
        self.country = location.country;
    }

    fn apply_role_profile(&mut self, profile: RoleProfile) {
        match profile {
            RoleProfile::Artist {
                art_form,
                specialisation,
            } => {
                self.art_form = Some(art_form);
                self.specialisation = Some(specialisation);
            }
            RoleProfile::ViewerStudent { art_form } => {
                self.art_form = Some(art_form);
            }
            RoleProfile::Institution {
                university_affiliation,
                registration_id,
                location,
            } => {
                self.institution_name = Some(university_affiliation);
                self.registration_id = Some(registration_id);
                self.set_location(location);
            }
            RoleProfile::ServiceProvider {
                owner_name,
                expertise,
                location,
            } => {
                self.owner_name = Some(owner_name);
                self.expertise = Some(expertise);
                self.set_location(location);
            }
        }
    }
}

async fn get_profile(
    session: Session,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let user = state
        .user_store
        .get_user_by_username(&username)?
        .ok_or(ApiError::NotFound)?;

    let follower_count = state.social_store.follower_count(user.id)?;
    let number_of_posts = state.social_store.post_count(user.id)?;
    let following = state.social_store.is_following(session.user_id, user.id)?;

    let mut profile = ProfileView::new(&user, follower_count, number_of_posts, following);
    if let Some(role_profile) = state.user_store.get_role_profile(user.id, user.role)? {
        profile.apply_role_profile(role_profile);
    }

    let posts = state.social_store.posts_by_user(user.id)?;
    let posts = post_views(&state.user_store, posts)?;

    Ok(Json(ProfileResponse { profile, posts }).into_response())
}

async fn toggle_follow(
    session: Session,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let followed = state
        .user_store
        .get_user_by_username(&username)?
        .ok_or(ApiError::NotFound)?;

    if followed.id == session.user_id {
        return Err(ApiError::BadRequest(
            "Cannot follow yourself".to_string(),
        ));
    }

    let following = state
        .social_store
        .toggle_follow(session.user_id, followed.id)?;
    Ok(Json(ToggleFollowResponse { following }).into_response())
}

pub fn make_profile_routes(state: ServerState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/profile/{username}", get(get_profile))
        .route("/profile/{username}/follow", post(toggle_follow))
        .with_state(state)
}
