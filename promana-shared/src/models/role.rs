/// Role catalogue
///
/// Roles are rows, looked up by name. The initial migration seeds `admin`,
/// `member` and `viewer`; project permissions are derived from the name via
/// [`ProjectRole`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(50) NOT NULL UNIQUE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Role granted to the creator of a project
pub const ADMIN_ROLE: &str = "admin";

/// Role names seeded by the initial migration
pub const SEEDED_ROLES: [&str; 3] = ["admin", "member", "viewer"];

/// A row from the `roles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

impl Role {
    /// Single-row lookup by exact name
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await
    }
}

/// Permission level a role name confers within a project
///
/// Hierarchy: Admin > Member > Viewer. Role names outside the seeded set
/// map to `Viewer`, so an unrecognised role can read but never write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Read-only access
    Viewer,

    /// Can create workboards and tasks
    Member,

    /// Everything, including managing members
    Admin,
}

impl ProjectRole {
    /// Maps a role name to its permission level
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" => ProjectRole::Admin,
            "member" => ProjectRole::Member,
            _ => ProjectRole::Viewer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Admin => "admin",
            ProjectRole::Member => "member",
            ProjectRole::Viewer => "viewer",
        }
    }

    /// True when this role is at least `required`
    pub fn has_permission(&self, required: ProjectRole) -> bool {
        *self >= required
    }
}
