use anyhow::Result;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, error, info, warn};

use crate::postal::PostalLookup;
use crate::social::SocialStore;
use crate::user::validation;
use crate::user::{AuthTokenValue, FullUserStore, UserManager, UserRole};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::State,
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::feed::make_feed_routes;
use super::profile::make_profile_routes;
use super::session::Session;
use super::state::*;
use super::{log_requests, metrics, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub additional_data: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    pub user_name: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

/// Fills in district and state from the postal code when the client left
/// them blank. Lookup failures only cost the autofill, never the request.
async fn autofill_location(postal: &GuardedPostalLookup, profile: &mut crate::user::RoleProfile) {
    let Some(location) = profile.location_mut() else {
        return;
    };
    if location.district.is_some() || !validation::is_valid_postal_code(&location.postal_code) {
        metrics::record_postal_lookup("skipped");
        return;
    }
    match postal.lookup(&location.postal_code).await {
        Ok(Some(place)) => {
            metrics::record_postal_lookup("hit");
            location.district = Some(place.district);
            if location.state.is_none() {
                location.state = Some(place.state);
            }
            if location.country.is_none() {
                location.country = Some(place.country);
            }
        }
        Ok(None) => {
            metrics::record_postal_lookup("miss");
            debug!("No postal match for {}", location.postal_code);
        }
        Err(err) => {
            metrics::record_postal_lookup("error");
            warn!("Postal lookup failed: {:#}", err);
        }
    }
    if location.country.is_none() {
        location.country = Some("India".to_string());
    }
}

async fn register(
    State(state): State<ServerState>,
    Json(body): Json<RegisterBody>,
) -> Result<Response, ApiError> {
    let role = UserRole::from_str(&body.role)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {}", body.role)))?;

    let mut profile = validation::build_role_profile(role, &body.additional_data)
        .map_err(ApiError::Validation)?;

    autofill_location(&state.postal, &mut profile).await;

    let user_manager = state.user_manager.lock().unwrap();
    match user_manager.register(&body.user_name, &body.email, &body.password, role, profile) {
        Ok(user_id) => {
            metrics::record_registration(role.as_str(), "success");
            info!("Registered user {} with id {}", body.user_name, user_id);
            let body = serde_json::json!({ "message": "User registered successfully" });
            Ok((StatusCode::CREATED, Json(body)).into_response())
        }
        Err(err) => {
            metrics::record_registration(role.as_str(), "failure");
            Err(err.into())
        }
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let locked_manager = user_manager.lock().unwrap();
    let Some(user) = locked_manager.verify_login(&body.user_name, &body.password)? else {
        metrics::record_login_attempt("failure");
        return Err(ApiError::Unauthorized);
    };

    let auth_token = locked_manager.generate_auth_token(user.id)?;
    metrics::record_login_attempt("success");

    let response_body = serde_json::to_string(&LoginSuccessResponse {
        token: auth_token.value.0.clone(),
    })
    .map_err(anyhow::Error::from)?;

    let cookie_value = HeaderValue::from_str(&format!(
        "session_token={}; Path=/; HttpOnly",
        auth_token.value.0
    ))
    .map_err(anyhow::Error::from)?;
    let response = response::Builder::new()
        .status(StatusCode::CREATED)
        .header(axum::http::header::SET_COOKIE, cookie_value)
        .body(Body::from(response_body))
        .map_err(anyhow::Error::from)?;
    Ok(response)
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let locked_manager = user_manager.lock().unwrap();
    match locked_manager.delete_auth_token(session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            match response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
            {
                Ok(response) => response,
                Err(err) => {
                    error!("Failed to build logout response: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        user_store: Arc<dyn FullUserStore>,
        user_manager: Arc<Mutex<UserManager>>,
        social_store: Arc<dyn SocialStore>,
        postal: Arc<dyn PostalLookup>,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            user_manager,
            user_store,
            social_store,
            postal,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    user_store: Arc<dyn FullUserStore>,
    user_manager: Arc<Mutex<UserManager>>,
    social_store: Arc<dyn SocialStore>,
    postal: Arc<dyn PostalLookup>,
) -> Result<Router> {
    let state = ServerState::new(
        config.clone(),
        user_store,
        user_manager,
        social_store,
        postal,
    );

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let (student_routes, post_routes) = make_feed_routes(state.clone());
    let common_things_routes = make_profile_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/auth", auth_routes)
        .nest("/student", student_routes)
        .nest("/posts", post_routes)
        .nest("/common-things", common_things_routes);

    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    user_store: Arc<dyn FullUserStore>,
    user_manager: Arc<Mutex<UserManager>>,
    social_store: Arc<dyn SocialStore>,
    postal: Arc<dyn PostalLookup>,
    requests_logging_level: super::RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    feed_page_size: usize,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        feed_page_size,
        frontend_dir_path,
    };
    let app = make_app(config, user_store, user_manager, social_store, postal)?;

    let metrics_app: Router = Router::new().route("/metrics", get(metrics::metrics_handler));
    let metrics_listener =
        tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port)).await?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, metrics_app).await {
            error!("Metrics server failed: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postal::NoOpPostalLookup;
    use crate::social::SqliteSocialStore;
    use crate::user::SqliteUserStore;
    use axum::{body::Body, http::Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_test_app(temp_dir: &TempDir) -> Router {
        let user_store: Arc<dyn FullUserStore> =
            Arc::new(SqliteUserStore::new(temp_dir.path().join("user.db")).unwrap());
        let social_store: Arc<dyn SocialStore> =
            Arc::new(SqliteSocialStore::new(temp_dir.path().join("social.db")).unwrap());
        let user_manager = Arc::new(Mutex::new(UserManager::new(user_store.clone())));
        make_app(
            ServerConfig {
                requests_logging_level: super::super::RequestsLoggingLevel::None,
                ..ServerConfig::default()
            },
            user_store,
            user_manager,
            social_store,
            Arc::new(NoOpPostalLookup),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let temp_dir = TempDir::new().unwrap();
        let app = make_test_app(&temp_dir);

        let protected_routes = vec![
            ("GET", "/auth/logout"),
            ("GET", "/student/homeposts"),
            ("POST", "/posts"),
            ("POST", "/posts/123/toggle-like"),
            ("GET", "/common-things/profile/jane"),
            ("POST", "/common-things/profile/jane/follow"),
        ];

        for (method, route) in protected_routes.into_iter() {
            println!("Trying route {} {}", method, route);
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn home_responds_without_session() {
        let temp_dir = TempDir::new().unwrap();
        let app = make_test_app(&temp_dir);

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(86_400 + 3661)), "1d 01:01:01");
    }
}
