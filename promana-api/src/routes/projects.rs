/// Project endpoints
///
/// - `GET  /v1/projects` - Projects the caller belongs to, newest first
/// - `POST /v1/projects` - Create a project; the caller becomes its admin
/// - `GET  /v1/projects/:project_id` - One project, members only

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use promana_shared::auth::context::AuthContext;
use promana_shared::models::project::Project;
use promana_shared::services::projects::{self, NewProject};
use uuid::Uuid;

use crate::extract::{ApiJson, ApiPath};
use crate::{app::AppState, error::ApiResult};

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = projects::list_projects(state.store(), &auth).await?;
    Ok(Json(projects))
}

/// Create a project
///
/// ```text
/// POST /v1/projects
/// Authorization: Bearer <access token>
///
/// { "name": "Launch Plan", "description": "Q3 launch" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank name
/// - `500 Internal Server Error` with `role_not_found`: The admin role is missing
/// - `503 Service Unavailable`: The role lookup could not reach the database
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = projects::create_project(state.store(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = projects::get_project(state.store(), &auth, project_id).await?;
    Ok(Json(project))
}
