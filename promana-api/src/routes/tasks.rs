/// Task endpoints
///
/// - `GET  /v1/workboards/:workboard_id/tasks`
/// - `POST /v1/workboards/:workboard_id/tasks`

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use promana_shared::auth::context::AuthContext;
use promana_shared::models::task::Task;
use promana_shared::services::tasks::{self, NewTask};
use uuid::Uuid;

use crate::extract::{ApiJson, ApiPath};
use crate::{app::AppState, error::ApiResult};

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(workboard_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = tasks::list_tasks(state.store(), &auth, workboard_id).await?;
    Ok(Json(tasks))
}

/// Create a task; `due_date` defaults to now when omitted
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(workboard_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = tasks::create_task(state.store(), &auth, workboard_id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}
