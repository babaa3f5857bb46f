/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Create an account and sign in
/// - `POST /v1/auth/login` - Sign in and get tokens
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
/// - `GET  /v1/auth/check-username` - Username availability
/// - `POST /v1/auth/logout` - End the current session
/// - `GET  /v1/auth/session` - Profile of the signed-in user

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use promana_shared::auth::context::AuthContext;
use promana_shared::models::user::UserProfile;
use promana_shared::services::accounts::{
    self, AccessToken, AuthSession, Credentials, Registration, UsernameAvailability,
};
use promana_shared::services::ServiceError;
use serde::{Deserialize, Serialize};

use crate::extract::{ApiJson, ApiQuery};
use crate::{app::AppState, error::ApiResult};

/// Refresh token request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "Secret123",
///   "full_name": "Alice Smith",
///   "username": "alice"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user profile and a token pair.
///
/// # Errors
///
/// - `409 Conflict`: Email or username already taken
/// - `422 Unprocessable Entity`: Field validation failed
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Registration>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = accounts::register(state.store(), state.jwt_secret(), req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Sign in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid email or password
/// - `422 Unprocessable Entity`: Malformed email or empty password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Credentials>,
) -> ApiResult<Json<AuthSession>> {
    let session = accounts::login(state.store(), state.jwt_secret(), req).await?;
    Ok(Json(session))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Token invalid, expired, or its session ended
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<AccessToken>> {
    let token = accounts::refresh(state.store(), state.jwt_secret(), &req.refresh_token).await?;
    Ok(Json(token))
}

/// Username availability
///
/// Always answers with `{available, message}`; a missing or blank username
/// gets `400` with `available: false`.
pub async fn check_username(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> ApiResult<Response> {
    match accounts::check_username(state.store(), query.username.as_deref()).await {
        Ok(availability) => Ok(Json(availability).into_response()),
        Err(ServiceError::BadRequest(message)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(UsernameAvailability {
                available: false,
                message,
            }),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// End the current session; its tokens stop working immediately
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    accounts::logout(state.store(), &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Profile of the signed-in user
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let profile = accounts::current_user(state.store(), &auth).await?;
    Ok(Json(profile))
}
