/// Task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workboard_id UUID NOT NULL REFERENCES workboards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     due_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use promana_shared::models::task::{CreateTask, Task};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, workboard_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     workboard_id,
///     title: "Write launch post".to_string(),
///     description: None,
///     due_date: Utc::now(),
/// }).await?;
///
/// let tasks = Task::list_by_workboard(&pool, workboard_id).await?;
/// assert!(tasks.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// A row from the `tasks` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub workboard_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub workboard_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

impl Task {
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (workboard_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, workboard_id, title, description, due_date, created_at, updated_at
            "#,
        )
        .bind(data.workboard_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .fetch_one(executor)
        .await
    }

    /// Tasks of a workboard in creation order
    pub async fn list_by_workboard<'e, E>(
        executor: E,
        workboard_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, workboard_id, title, description, due_date, created_at, updated_at
            FROM tasks
            WHERE workboard_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(workboard_id)
        .fetch_all(executor)
        .await
    }
}
