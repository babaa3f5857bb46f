/// Workboard endpoints
///
/// - `GET  /v1/projects/:project_id/workboards`
/// - `POST /v1/projects/:project_id/workboards`
/// - `GET  /v1/workboards/:workboard_id`

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use promana_shared::auth::context::AuthContext;
use promana_shared::models::workboard::Workboard;
use promana_shared::services::workboards::{self, NewWorkboard};
use uuid::Uuid;

use crate::extract::{ApiJson, ApiPath};
use crate::{app::AppState, error::ApiResult};

pub async fn list_workboards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Workboard>>> {
    let boards = workboards::list_workboards(state.store(), &auth, project_id).await?;
    Ok(Json(boards))
}

/// Create a workboard in a project
///
/// A blank name is rejected with `422` before anything is written.
pub async fn create_workboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<NewWorkboard>,
) -> ApiResult<(StatusCode, Json<Workboard>)> {
    let board = workboards::create_workboard(state.store(), &auth, project_id, req).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_workboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(workboard_id): ApiPath<Uuid>,
) -> ApiResult<Json<Workboard>> {
    let board = workboards::get_workboard(state.store(), &auth, workboard_id).await?;
    Ok(Json(board))
}
