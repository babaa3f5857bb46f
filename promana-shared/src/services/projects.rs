/// Project operations
///
/// Creating a project also makes the creator its admin. Both rows are
/// written in one store transaction, so a failed membership insert never
/// leaves a project nobody can see.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::roles::{resolve_role, RoleLookup};
use super::{not_blank, optional_text, validate_input, ServiceError, ServiceResult};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::context::AuthContext;
use crate::models::project::{CreateProject, Project};
use crate::models::role::ADMIN_ROLE;
use crate::store::Store;

/// Input for creating a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Creates a project owned by the caller
///
/// # Errors
///
/// - `Validation` for a blank name, before any store access
/// - `RoleNotFound` when the `admin` role row is missing
/// - `Unavailable` when the role lookup could not reach the store
pub async fn create_project(
    store: &dyn Store,
    auth: &AuthContext,
    input: NewProject,
) -> ServiceResult<Project> {
    validate_input(&input)?;

    let role_id = match resolve_role(store, ADMIN_ROLE).await {
        RoleLookup::Found(id) => id,
        RoleLookup::NotFound => return Err(ServiceError::RoleNotFound),
        RoleLookup::TransientFailure(detail) => {
            return Err(ServiceError::Unavailable(format!(
                "Could not look up the admin role: {}",
                detail
            )))
        }
    };

    let data = CreateProject {
        name: input.name.trim().to_string(),
        description: optional_text(input.description),
    };

    let (project, _membership) = store
        .create_project_with_owner(data, auth.user_id, role_id)
        .await?;

    tracing::info!(
        project_id = %project.id,
        user_id = %auth.user_id,
        "Project created"
    );

    Ok(project)
}

/// Projects the caller is a member of, newest first
pub async fn list_projects(store: &dyn Store, auth: &AuthContext) -> ServiceResult<Vec<Project>> {
    Ok(store.list_projects_for_user(auth.user_id).await?)
}

/// A single project the caller is a member of
pub async fn get_project(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
) -> ServiceResult<Project> {
    let project = store
        .find_project(project_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

    require_permission(store, auth, project.id, ResourcePermission::Read).await?;

    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectStatus;
    use crate::models::user::CreateUser;
    use crate::services::FieldError;
    use crate::store::MemoryStore;

    async fn sign_up(store: &MemoryStore, email: &str) -> AuthContext {
        let user = store
            .create_user(CreateUser {
                email: email.to_string(),
                full_name: "Test User".to_string(),
                username: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        AuthContext::new(user.id, Uuid::new_v4())
    }

    fn named(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_writes_project_and_admin_membership() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;

        let project = create_project(&store, &alice, named("  Launch Plan  "))
            .await
            .unwrap();

        assert_eq!(project.name, "Launch Plan");
        assert_eq!(project.status(), Some(ProjectStatus::Active));
        assert_eq!(store.project_count().await, 1);
        assert_eq!(store.membership_count().await, 1);

        let role = store
            .find_membership_role(project.id, alice.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(role.name, "admin");
    }

    #[tokio::test]
    async fn test_blank_name_rejected_without_writes() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;

        let err = create_project(&store, &alice, named("   ")).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(ref fields) if fields == &[FieldError::new("name", "This field is required")]
        ));
        assert_eq!(store.project_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_admin_role() {
        let store = MemoryStore::new();
        let alice = sign_up(&store, "alice@example.com").await;

        let err = create_project(&store, &alice, named("Launch Plan"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::RoleNotFound));
        assert_eq!(err.to_string(), "Admin role not found. Please contact support.");
        assert_eq!(store.project_count().await, 0);
    }

    #[tokio::test]
    async fn test_role_lookup_failure_is_unavailable() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        store.fail_role_lookups(true);

        let err = create_project(&store, &alice, named("Launch Plan"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(store.project_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_membership_leaves_no_project() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        store.fail_membership_inserts(true);

        let err = create_project(&store, &alice, named("Launch Plan"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(store.project_count().await, 0);
        assert_eq!(store.membership_count().await, 0);
        assert!(list_projects(&store, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_only_member_projects() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let bob = sign_up(&store, "bob@example.com").await;

        let first = create_project(&store, &alice, named("First")).await.unwrap();
        let second = create_project(&store, &alice, named("Second")).await.unwrap();
        create_project(&store, &bob, named("Bob's")).await.unwrap();

        let ids: Vec<Uuid> = list_projects(&store, &alice)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_get_project_requires_membership() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let bob = sign_up(&store, "bob@example.com").await;
        let project = create_project(&store, &alice, named("Launch Plan")).await.unwrap();

        assert_eq!(get_project(&store, &alice, project.id).await.unwrap().id, project.id);
        assert!(matches!(
            get_project(&store, &bob, project.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            get_project(&store, &alice, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
