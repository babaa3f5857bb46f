/// Project-level permission checks
///
/// Access to a project and everything inside it flows from the caller's
/// membership row:
///
/// 1. **Membership**: the user must hold a `user_roles` row for the project
/// 2. **Role level**: the row's role name maps to a [`ProjectRole`], which
///    must meet the level the operation needs
///
/// # Example
///
/// ```no_run
/// use promana_shared::auth::authorization::{require_permission, ResourcePermission};
/// use promana_shared::auth::context::AuthContext;
/// use promana_shared::store::Store;
/// use uuid::Uuid;
///
/// # async fn example(store: &dyn Store, auth: AuthContext, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Members and admins may add workboards
/// require_permission(store, &auth, project_id, ResourcePermission::Write).await?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::context::AuthContext;
use crate::models::role::ProjectRole;
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: ProjectRole,
        actual: ProjectRole,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What an operation does to a project's data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePermission {
    /// View the project, its workboards and tasks (Viewer+)
    Read,

    /// Create workboards and tasks (Member+)
    Write,

    /// Manage members (Admin)
    Manage,
}

impl ResourcePermission {
    pub fn min_role(&self) -> ProjectRole {
        match self {
            ResourcePermission::Read => ProjectRole::Viewer,
            ResourcePermission::Write => ProjectRole::Member,
            ResourcePermission::Manage => ProjectRole::Admin,
        }
    }
}

/// The caller's role in a project
///
/// # Errors
///
/// `AuthzError::NotMember` when the user holds no membership
pub async fn require_membership(
    store: &dyn Store,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectRole, AuthzError> {
    let role = store
        .find_membership_role(project_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(project_id))?;

    Ok(ProjectRole::from_name(&role.name))
}

/// Requires the caller's role to cover `permission`, returning the role
pub async fn require_permission(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
    permission: ResourcePermission,
) -> Result<ProjectRole, AuthzError> {
    let actual = require_membership(store, project_id, auth.user_id).await?;
    let required = permission.min_role();

    if !actual.has_permission(required) {
        return Err(AuthzError::InsufficientRole { required, actual });
    }

    Ok(actual)
}
