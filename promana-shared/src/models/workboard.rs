/// Workboard model and database operations
///
/// A workboard is a named grouping of tasks within a project.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workboards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// A row from the `workboards` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workboard {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a workboard
#[derive(Debug, Clone)]
pub struct CreateWorkboard {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl Workboard {
    pub async fn create<'e, E>(executor: E, data: CreateWorkboard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workboard>(
            r#"
            INSERT INTO workboards (project_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, name, description, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workboard>(
            r#"
            SELECT id, project_id, name, description, created_at, updated_at
            FROM workboards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Workboards of a project in creation order
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workboard>(
            r#"
            SELECT id, project_id, name, description, created_at, updated_at
            FROM workboards
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
