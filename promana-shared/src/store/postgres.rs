/// PostgreSQL-backed store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::membership::{CreateMembership, Membership, ProjectMember};
use crate::models::project::{CreateProject, Project};
use crate::models::role::Role;
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};
use crate::models::workboard::{CreateWorkboard, Workboard};

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn record_login(&self, user_id: Uuid) -> StoreResult<bool> {
        Ok(User::update_last_login(&self.pool, user_id).await?)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(Role::find_by_name(&self.pool, name).await?)
    }

    async fn create_project_with_owner(
        &self,
        data: CreateProject,
        owner_id: Uuid,
        role_id: Uuid,
    ) -> StoreResult<(Project, Membership)> {
        let mut tx = self.pool.begin().await?;

        let project = Project::create(&mut *tx, data).await?;
        let membership = Membership::create(
            &mut *tx,
            CreateMembership {
                user_id: owner_id,
                project_id: project.id,
                role_id,
            },
        )
        .await?;

        // Dropping `tx` on an early return above rolls back the project insert
        tx.commit().await?;

        Ok((project, membership))
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_user(&self.pool, user_id).await?)
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership> {
        Ok(Membership::create(&self.pool, data).await?)
    }

    async fn find_membership_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Role>> {
        Ok(Membership::find_role(&self.pool, project_id, user_id).await?)
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>> {
        Ok(Membership::list_members(&self.pool, project_id).await?)
    }

    async fn create_workboard(&self, data: CreateWorkboard) -> StoreResult<Workboard> {
        Ok(Workboard::create(&self.pool, data).await?)
    }

    async fn find_workboard(&self, id: Uuid) -> StoreResult<Option<Workboard>> {
        Ok(Workboard::find_by_id(&self.pool, id).await?)
    }

    async fn list_workboards(&self, project_id: Uuid) -> StoreResult<Vec<Workboard>> {
        Ok(Workboard::list_by_project(&self.pool, project_id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn list_tasks(&self, workboard_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_workboard(&self.pool, workboard_id).await?)
    }

    async fn create_session(&self, data: CreateSession) -> StoreResult<Session> {
        Ok(Session::create(&self.pool, data).await?)
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(Session::find_by_id(&self.pool, id).await?)
    }

    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Session::revoke(&self.pool, id).await?)
    }
}
