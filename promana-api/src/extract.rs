/// Request extractors with JSON rejections
///
/// Wrap axum's `Json`, `Path` and `Query` so malformed bodies and bad path
/// or query parameters come back in the same `{error, message, details}`
/// shape as every other failure.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use promana_shared::services::FieldError;

use crate::error::ApiError;

const BODY_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Splits a serde data error into the offending field and its message
///
/// Falls back to a `body` field when the error has no path.
fn body_field_error(text: &str) -> FieldError {
    let detail = text.strip_prefix(BODY_PREFIX).unwrap_or(text);
    match detail.split_once(": ") {
        Some((field, message)) if !field.is_empty() && !field.contains(' ') => {
            FieldError::new(field, message)
        }
        _ => FieldError::new("body", detail),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::ValidationError(vec![body_field_error(&err.body_text())])
            }
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::BadRequest("Request body is not valid JSON".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Expected Content-Type: application/json".to_string())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        ApiError::BadRequest("Invalid identifier in URL".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
