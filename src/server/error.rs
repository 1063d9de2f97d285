use crate::user::validation::FieldError;
use crate::user::RegistrationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors a handler can bubble up, each mapped to an HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request fields")]
    Validation(Vec<FieldError>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("{0} already taken")]
    Conflict(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorsBody {
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Invalid(errors) => ApiError::Validation(errors),
            RegistrationError::Taken(field) => ApiError::Conflict(field),
            RegistrationError::Store(err) => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorsBody { errors })).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageBody { message })).into_response()
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Conflict(field) => (
                StatusCode::CONFLICT,
                Json(MessageBody {
                    message: format!("{} already taken", field),
                }),
            )
                .into_response(),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
