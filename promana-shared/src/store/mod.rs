/// Storage boundary
///
/// Every read and write the services perform goes through the [`Store`]
/// trait. Two implementations exist:
///
/// - [`PgStore`]: PostgreSQL through the model functions in [`crate::models`]
/// - [`MemoryStore`]: an in-process store with the same constraints, used by
///   tests and local tooling
///
/// Lookups that may miss return `Option`, collections return `Vec`, and
/// inserts return the stored row.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use promana_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), promana_shared::store::StoreError> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::seeded());
/// let admin = store.find_role_by_name("admin").await?;
/// assert!(admin.is_some());
/// # Ok(())
/// # }
/// ```

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::membership::{CreateMembership, Membership, ProjectMember};
use crate::models::project::{CreateProject, Project};
use crate::models::role::Role;
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};
use crate::models::workboard::{CreateWorkboard, Workboard};

/// Constraint names shared by both backends
pub mod constraints {
    pub const USERS_EMAIL_KEY: &str = "users_email_key";
    pub const USERS_USERNAME_KEY: &str = "users_username_key";
    pub const USER_ROLES_USER_PROJECT_KEY: &str = "user_roles_user_project_key";
    pub const USER_ROLES_USER_ID_FKEY: &str = "user_roles_user_id_fkey";
    pub const USER_ROLES_PROJECT_ID_FKEY: &str = "user_roles_project_id_fkey";
    pub const USER_ROLES_ROLE_ID_FKEY: &str = "user_roles_role_id_fkey";
    pub const WORKBOARDS_PROJECT_ID_FKEY: &str = "workboards_project_id_fkey";
    pub const TASKS_WORKBOARD_ID_FKEY: &str = "tasks_workboard_id_fkey";
    pub const SESSIONS_USER_ID_FKEY: &str = "sessions_user_id_fkey";
    pub const PROJECTS_NAME_NOT_BLANK: &str = "projects_name_not_blank";
    pub const WORKBOARDS_NAME_NOT_BLANK: &str = "workboards_name_not_blank";
    pub const TASKS_TITLE_NOT_BLANK: &str = "tasks_title_not_blank";
}

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A referenced row does not exist
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A check constraint rejected the row
    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// The backend could not be reached (pool exhausted, connection lost)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Constraint name for constraint violations
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::ForeignKeyViolation { constraint }
            | StoreError::CheckViolation { constraint } => Some(constraint),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                if db_err.is_unique_violation() {
                    StoreError::UniqueViolation { constraint }
                } else if db_err.is_foreign_key_violation() {
                    StoreError::ForeignKeyViolation { constraint }
                } else if db_err.is_check_violation() {
                    StoreError::CheckViolation { constraint }
                } else {
                    StoreError::Database(db_err.to_string())
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// The tables the application reads and writes
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backend
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn record_login(&self, user_id: Uuid) -> StoreResult<bool>;

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Inserts a project and the owner's membership atomically
    ///
    /// Either both rows are written or neither is.
    async fn create_project_with_owner(
        &self,
        data: CreateProject,
        owner_id: Uuid,
        role_id: Uuid,
    ) -> StoreResult<(Project, Membership)>;
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects the user is a member of, newest first
    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership>;
    async fn find_membership_role(&self, project_id: Uuid, user_id: Uuid)
        -> StoreResult<Option<Role>>;
    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>>;

    async fn create_workboard(&self, data: CreateWorkboard) -> StoreResult<Workboard>;
    async fn find_workboard(&self, id: Uuid) -> StoreResult<Option<Workboard>>;
    async fn list_workboards(&self, project_id: Uuid) -> StoreResult<Vec<Workboard>>;

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;
    async fn list_tasks(&self, workboard_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn create_session(&self, data: CreateSession) -> StoreResult<Session>;
    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>>;
    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool>;
}
