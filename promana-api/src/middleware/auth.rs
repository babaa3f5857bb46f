/// Bearer token authentication
///
/// Validates the access token, checks that its session is still open, and
/// puts the resulting `AuthContext` into request extensions for handlers to
/// extract with `Extension<AuthContext>`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use promana_shared::services::accounts;

use crate::app::AppState;
use crate::error::ApiError;

fn bearer_token(request: &Request) -> Result<String, ApiError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?;
    let auth = accounts::authenticate(state.store(), state.jwt_secret(), &token).await?;

    tracing::debug!(user_id = %auth.user_id, "Request authenticated");

    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}
