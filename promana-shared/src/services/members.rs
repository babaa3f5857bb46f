/// Project membership operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::roles::{resolve_role, RoleLookup};
use super::{not_blank, validate_input, FieldError, ServiceError, ServiceResult};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::context::AuthContext;
use crate::models::membership::{CreateMembership, ProjectMember};
use crate::models::user::User;
use crate::store::Store;

fn default_member_role() -> String {
    "member".to_string()
}

/// Input for adding a member to a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMember {
    /// Username or email of an existing user
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub user: String,

    /// Role name, `member` when omitted
    #[serde(default = "default_member_role")]
    #[validate(custom(function = "not_blank"))]
    pub role: String,
}

/// Members of a project in the order they joined
pub async fn list_members(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
) -> ServiceResult<Vec<ProjectMember>> {
    require_permission(store, auth, project_id, ResourcePermission::Read).await?;
    Ok(store.list_members(project_id).await?)
}

async fn find_user(store: &dyn Store, identifier: &str) -> ServiceResult<User> {
    let user = if identifier.contains('@') {
        store.find_user_by_email(identifier).await?
    } else {
        store.find_user_by_username(identifier).await?
    };

    user.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
}

/// Adds an existing user to a project; admins only
pub async fn add_member(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
    input: NewMember,
) -> ServiceResult<ProjectMember> {
    validate_input(&input)?;
    require_permission(store, auth, project_id, ResourcePermission::Manage).await?;

    let user = find_user(store, input.user.trim()).await?;
    let role_name = input.role.trim().to_lowercase();

    let role_id = match resolve_role(store, &role_name).await {
        RoleLookup::Found(id) => id,
        RoleLookup::NotFound => {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "role",
                format!("Unknown role: {}", role_name),
            )]))
        }
        RoleLookup::TransientFailure(detail) => {
            return Err(ServiceError::Unavailable(format!(
                "Could not look up role {}: {}",
                role_name, detail
            )))
        }
    };

    let membership = store
        .create_membership(CreateMembership {
            user_id: user.id,
            project_id,
            role_id,
        })
        .await?;

    tracing::info!(
        project_id = %project_id,
        user_id = %user.id,
        role = %role_name,
        "Member added"
    );

    Ok(ProjectMember {
        user_id: user.id,
        email: user.email,
        full_name: user.full_name,
        username: user.username,
        role_id,
        role_name,
        joined_at: membership.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::services::projects::{create_project, NewProject};
    use crate::store::MemoryStore;

    async fn sign_up(store: &MemoryStore, email: &str, username: &str) -> AuthContext {
        let user = store
            .create_user(CreateUser {
                email: email.to_string(),
                full_name: username.to_string(),
                username: Some(username.to_string()),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        AuthContext::new(user.id, Uuid::new_v4())
    }

    async fn setup() -> (MemoryStore, AuthContext, AuthContext, Uuid) {
        let store = MemoryStore::seeded();
        let alice = sign_up(&store, "alice@example.com", "alice").await;
        let bob = sign_up(&store, "bob@example.com", "bob").await;
        let project = create_project(
            &store,
            &alice,
            NewProject {
                name: "Launch Plan".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        (store, alice, bob, project.id)
    }

    fn invite(user: &str, role: &str) -> NewMember {
        NewMember {
            user: user.to_string(),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_adds_member_by_username() {
        let (store, alice, bob, project_id) = setup().await;

        let added = add_member(&store, &alice, project_id, invite("Bob", "Member"))
            .await
            .unwrap();
        assert_eq!(added.user_id, bob.user_id);
        assert_eq!(added.role_name, "member");

        let members = list_members(&store, &bob, project_id).await.unwrap();
        let roles: Vec<(&str, &str)> = members
            .iter()
            .map(|m| (m.email.as_str(), m.role_name.as_str()))
            .collect();
        assert_eq!(
            roles,
            [("alice@example.com", "admin"), ("bob@example.com", "member")]
        );
    }

    #[tokio::test]
    async fn test_add_by_email_and_duplicate_conflicts() {
        let (store, alice, _bob, project_id) = setup().await;

        add_member(&store, &alice, project_id, invite("bob@example.com", "viewer"))
            .await
            .unwrap();
        assert!(matches!(
            add_member(&store, &alice, project_id, invite("bob", "member")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_only_admins_add_members() {
        let (store, alice, bob, project_id) = setup().await;
        sign_up(&store, "carol@example.com", "carol").await;
        add_member(&store, &alice, project_id, invite("bob", "member"))
            .await
            .unwrap();

        assert!(matches!(
            add_member(&store, &bob, project_id, invite("carol", "member")).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_and_role() {
        let (store, alice, _bob, project_id) = setup().await;

        assert!(matches!(
            add_member(&store, &alice, project_id, invite("nobody", "member")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            add_member(&store, &alice, project_id, invite("bob", "owner")).await,
            Err(ServiceError::Validation(ref f)) if f[0].field == "role"
        ));
    }

    #[tokio::test]
    async fn test_non_member_cannot_list() {
        let (store, _alice, bob, project_id) = setup().await;

        assert!(matches!(
            list_members(&store, &bob, project_id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
