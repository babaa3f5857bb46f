/// Project memberships (`user_roles`)
///
/// A membership binds a user to a project with a role from the `roles`
/// table. A user holds at most one membership per project.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     role_id UUID NOT NULL REFERENCES roles(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT user_roles_user_project_key UNIQUE (user_id, project_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use promana_shared::models::membership::{CreateMembership, Membership};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, project_id: Uuid, role_id: Uuid) -> Result<(), sqlx::Error> {
/// Membership::create(&pool, CreateMembership { user_id, project_id, role_id }).await?;
///
/// let role = Membership::find_role(&pool, project_id, user_id).await?;
/// assert!(role.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::role::Role;

/// A row from the `user_roles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Copy)]
pub struct CreateMembership {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role_id: Uuid,
}

/// A member of a project as shown in the member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub username: Option<String>,
    pub role_id: Uuid,
    pub role_name: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Inserts a membership
    ///
    /// # Errors
    ///
    /// - unique violation `user_roles_user_project_key` if the user is already a member
    /// - foreign key violation if the user, project or role does not exist
    pub async fn create<'e, E>(executor: E, data: CreateMembership) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO user_roles (user_id, project_id, role_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, project_id, role_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.role_id)
        .fetch_one(executor)
        .await
    }

    /// The role a user holds in a project, None when not a member
    pub async fn find_role<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.project_id = $1 AND ur.user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Members of a project in the order they joined
    pub async fn list_members<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMember>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT u.id AS user_id, u.email::TEXT AS email, u.full_name,
                   u.username::TEXT AS username, r.id AS role_id, r.name AS role_name,
                   ur.created_at AS joined_at
            FROM user_roles ur
            JOIN users u ON u.id = ur.user_id
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.project_id = $1
            ORDER BY ur.created_at, ur.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
