use super::state::ServerState;
use crate::user::AuthTokenValue;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: String,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

pub enum SessionExtractionError {
    AccessDenied,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()?
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &mut Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
    // Clients may send the token bare or with the Bearer scheme.
    Some(
        value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .unwrap_or(value),
    )
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<Session> {
    let token = match extract_session_token_from_cookies(parts, ctx)
        .await
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return None;
        }
        Some(x) => x,
    };

    let user_manager = ctx.user_manager.lock().unwrap();
    let auth_token_value = AuthTokenValue(token);
    let auth_token = match user_manager.get_auth_token(&auth_token_value) {
        Ok(Some(token)) => {
            // Not critical for authentication, log and move on.
            if let Err(e) = user_manager.update_auth_token_last_used(&auth_token_value) {
                debug!("Failed to update auth token last_used timestamp: {}", e);
            }
            token
        }
        Ok(None) => {
            debug!("Auth token not found in database");
            return None;
        }
        Err(e) => {
            debug!("Failed to get auth token from database: {}", e);
            return None;
        }
    };

    Some(Session {
        user_id: auth_token.user_id,
        token: auth_token.value.0,
    })
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await
            .ok_or(SessionExtractionError::AccessDenied)
    }
}

impl FromRequestParts<ServerState> for Option<Session> {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        Ok(extract_session_from_request_parts(parts, ctx).await)
    }
}
