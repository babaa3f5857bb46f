/// Project membership endpoints
///
/// - `GET  /v1/projects/:project_id/members`
/// - `POST /v1/projects/:project_id/members` - Admins only

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use promana_shared::auth::context::AuthContext;
use promana_shared::models::membership::ProjectMember;
use promana_shared::services::members::{self, NewMember};
use uuid::Uuid;

use crate::extract::{ApiJson, ApiPath};
use crate::{app::AppState, error::ApiResult};

pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ProjectMember>>> {
    let members = members::list_members(state.store(), &auth, project_id).await?;
    Ok(Json(members))
}

/// Add an existing user by username or email
///
/// ```text
/// POST /v1/projects/:project_id/members
///
/// { "user": "bob", "role": "member" }
/// ```
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<NewMember>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    let member = members::add_member(state.store(), &auth, project_id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}
