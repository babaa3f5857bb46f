/// Workboard operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{not_blank, optional_text, validate_input, ServiceError, ServiceResult};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::context::AuthContext;
use crate::models::workboard::{CreateWorkboard, Workboard};
use crate::store::Store;

/// Input for creating a workboard; the project comes from the route
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewWorkboard {
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

/// Adds a workboard to a project; requires member access
pub async fn create_workboard(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
    input: NewWorkboard,
) -> ServiceResult<Workboard> {
    validate_input(&input)?;
    require_permission(store, auth, project_id, ResourcePermission::Write).await?;

    let workboard = store
        .create_workboard(CreateWorkboard {
            project_id,
            name: input.name.trim().to_string(),
            description: optional_text(input.description),
        })
        .await?;

    tracing::info!(
        workboard_id = %workboard.id,
        project_id = %project_id,
        "Workboard created"
    );

    Ok(workboard)
}

/// Workboards of a project in creation order
pub async fn list_workboards(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
) -> ServiceResult<Vec<Workboard>> {
    require_permission(store, auth, project_id, ResourcePermission::Read).await?;
    Ok(store.list_workboards(project_id).await?)
}

pub async fn get_workboard(
    store: &dyn Store,
    auth: &AuthContext,
    workboard_id: Uuid,
) -> ServiceResult<Workboard> {
    let workboard = store
        .find_workboard(workboard_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Workboard not found".to_string()))?;

    require_permission(store, auth, workboard.project_id, ResourcePermission::Read).await?;

    Ok(workboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::CreateMembership;
    use crate::models::user::CreateUser;
    use crate::services::projects::{create_project, NewProject};
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

    async fn project_for(store: &MemoryStore, auth: &AuthContext) -> Uuid {
        create_project(
            store,
            auth,
            NewProject {
                name: "Launch Plan".to_string(),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn board(name: &str) -> NewWorkboard {
        NewWorkboard {
            name: name.to_string(),
            description: Some("   ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_created_workboard_listed_once() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let project_id = project_for(&store, &alice).await;

        let created = create_workboard(&store, &alice, project_id, board("Backlog"))
            .await
            .unwrap();
        assert_eq!(created.description, None);

        let listed = list_workboards(&store, &alice, project_id).await.unwrap();
        assert_eq!(listed.iter().filter(|w| w.id == created.id).count(), 1);
        assert_eq!(
            get_workboard(&store, &alice, created.id).await.unwrap().name,
            "Backlog"
        );
    }

    #[tokio::test]
    async fn test_blank_name_rejected_without_insert() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let project_id = project_for(&store, &alice).await;

        for name in ["", "  \t"] {
            let err = create_workboard(&store, &alice, project_id, board(name))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert_eq!(store.workboard_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_member_forbidden() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let mallory = sign_up(&store, "mallory@example.com").await;
        let project_id = project_for(&store, &alice).await;
        let created = create_workboard(&store, &alice, project_id, board("Backlog"))
            .await
            .unwrap();

        assert!(matches!(
            list_workboards(&store, &mallory, project_id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            create_workboard(&store, &mallory, project_id, board("Sneaky")).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            get_workboard(&store, &mallory, created.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_viewer_can_read_but_not_write() {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com").await;
        let victor = sign_up(&store, "victor@example.com").await;
        let project_id = project_for(&store, &alice).await;

        let viewer = store.find_role_by_name("viewer").await.unwrap().unwrap();
        store
            .create_membership(CreateMembership {
                user_id: victor.user_id,
                project_id,
                role_id: viewer.id,
            })
            .await
            .unwrap();

        assert!(list_workboards(&store, &victor, project_id).await.is_ok());
        assert!(matches!(
            create_workboard(&store, &victor, project_id, board("Nope")).await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
