/// Task operations
///
/// Tasks belong to a workboard; access is decided by the caller's
/// membership in the workboard's project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{not_blank, optional_text, validate_input, ServiceError, ServiceResult};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::context::AuthContext;
use crate::models::task::{CreateTask, Task};
use crate::models::workboard::Workboard;
use crate::store::Store;

/// Input for creating a task; the workboard comes from the route
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Defaults to the moment of creation
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

async fn load_workboard(store: &dyn Store, workboard_id: Uuid) -> ServiceResult<Workboard> {
    store
        .find_workboard(workboard_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Workboard not found".to_string()))
}

/// Adds a task to a workboard; requires member access to its project
pub async fn create_task(
    store: &dyn Store,
    auth: &AuthContext,
    workboard_id: Uuid,
    input: NewTask,
) -> ServiceResult<Task> {
    validate_input(&input)?;

    let workboard = load_workboard(store, workboard_id).await?;
    require_permission(store, auth, workboard.project_id, ResourcePermission::Write).await?;

    let task = store
        .create_task(CreateTask {
            workboard_id,
            title: input.title.trim().to_string(),
            description: optional_text(input.description),
            due_date: input.due_date.unwrap_or_else(Utc::now),
        })
        .await?;

    tracing::info!(task_id = %task.id, workboard_id = %workboard_id, "Task created");

    Ok(task)
}

/// Tasks of a workboard in creation order
pub async fn list_tasks(
    store: &dyn Store,
    auth: &AuthContext,
    workboard_id: Uuid,
) -> ServiceResult<Vec<Task>> {
    let workboard = load_workboard(store, workboard_id).await?;
    require_permission(store, auth, workboard.project_id, ResourcePermission::Read).await?;

    Ok(store.list_tasks(workboard_id).await?)
}
