//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::domain::aggregates::CouponError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("product {0} is not available")]
    Unpriceable(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

impl From<CouponError> for ApiError {
    fn from(e: CouponError) -> Self { Self::Validation(e.to_string()) }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": code, "message": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
            Self::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
            Self::Unpriceable(_) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "unpriceable_item", message),
            Self::Store(StoreError::DuplicateCode(_)) => json_error(StatusCode::CONFLICT, "duplicate_code", message),
            Self::Store(e) => {
                tracing::error!(error = %e, "storage failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "internal storage error")
            }
        }
    }
}
