use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::render::escape_html;
use crate::{connections::ProfileError, executor::ExecutionError, hop::InvalidLimit};

/// Failures reported back to the HTTP caller, verbatim.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("No data found")]
    EmptyResult,
    #[error(transparent)]
    InvalidLimit(#[from] InvalidLimit),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Profile(ProfileError::AlreadyExists { .. })
            | AppError::Profile(ProfileError::NotFound { .. }) => StatusCode::BAD_REQUEST,
            AppError::Profile(ProfileError::Persistence { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::EmptyResult => StatusCode::NOT_FOUND,
            AppError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// HTML fragment rendering, used by the form endpoints.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }
        let body = format!("<p>Error: {}</p>", escape_html(&self.to_string()));
        (status, Html(body)).into_response()
    }
}

/// JSON `{"detail": ...}` rendering, used by `/hops`.
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for JsonError {
    fn from(err: AppError) -> Self {
        JsonError(err)
    }
}

impl From<ExecutionError> for JsonError {
    fn from(err: ExecutionError) -> Self {
        JsonError(err.into())
    }
}

impl From<InvalidLimit> for JsonError {
    fn from(err: InvalidLimit) -> Self {
        JsonError(err.into())
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}
