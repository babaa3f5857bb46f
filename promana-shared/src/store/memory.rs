/// In-memory store
///
/// Mirrors the PostgreSQL schema closely enough to run the services
/// unchanged: case-insensitive unique emails and usernames, one membership
/// per (user, project), foreign keys on every reference, non-blank checks on
/// names and titles, and the same constraint names in errors.
///
/// Timestamps come from a clock that advances one microsecond per write, so
/// creation order is always observable through `created_at`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::constraints;
use super::{Store, StoreError, StoreResult};
use crate::models::membership::{CreateMembership, Membership, ProjectMember};
use crate::models::project::{CreateProject, Project, ProjectStatus};
use crate::models::role::{Role, SEEDED_ROLES};
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User, DEFAULT_ACCOUNT_ROLE};
use crate::models::workboard::{CreateWorkboard, Workboard};

#[derive(Debug)]
struct Tables {
    epoch: DateTime<Utc>,
    ticks: i64,
    users: Vec<User>,
    roles: Vec<Role>,
    projects: Vec<Project>,
    memberships: Vec<Membership>,
    workboards: Vec<Workboard>,
    tasks: Vec<Task>,
    sessions: Vec<Session>,
}

impl Tables {
    fn new() -> Self {
        Self {
            epoch: Utc::now(),
            ticks: 0,
            users: Vec::new(),
            roles: Vec::new(),
            projects: Vec::new(),
            memberships: Vec::new(),
            workboards: Vec::new(),
            tasks: Vec::new(),
            sessions: Vec::new(),
        }
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        self.epoch + Duration::microseconds(self.ticks)
    }

    fn insert_membership(&mut self, data: CreateMembership) -> StoreResult<Membership> {
        if !self.users.iter().any(|u| u.id == data.user_id) {
            return Err(fk(constraints::USER_ROLES_USER_ID_FKEY));
        }
        if !self.projects.iter().any(|p| p.id == data.project_id) {
            return Err(fk(constraints::USER_ROLES_PROJECT_ID_FKEY));
        }
        if !self.roles.iter().any(|r| r.id == data.role_id) {
            return Err(fk(constraints::USER_ROLES_ROLE_ID_FKEY));
        }
        if self
            .memberships
            .iter()
            .any(|m| m.user_id == data.user_id && m.project_id == data.project_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::USER_ROLES_USER_PROJECT_KEY.to_string(),
            });
        }

        let membership = Membership {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            project_id: data.project_id,
            role_id: data.role_id,
            created_at: self.now(),
        };
        self.memberships.push(membership.clone());
        Ok(membership)
    }
}

fn fk(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_string(),
    }
}

fn check(constraint: &str) -> StoreError {
    StoreError::CheckViolation {
        constraint: constraint.to_string(),
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Store kept entirely in process memory
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_role_lookups: AtomicBool,
    fail_membership_inserts: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store with no roles
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
            fail_role_lookups: AtomicBool::new(false),
            fail_membership_inserts: AtomicBool::new(false),
        }
    }

    /// A store holding the role rows the initial migration seeds
    pub fn seeded() -> Self {
        let mut tables = Tables::new();
        tables.roles = SEEDED_ROLES
            .iter()
            .map(|name| Role {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
            })
            .collect();

        Self {
            tables: RwLock::new(tables),
            fail_role_lookups: AtomicBool::new(false),
            fail_membership_inserts: AtomicBool::new(false),
        }
    }

    /// Makes role lookups fail with `StoreError::Unavailable`
    pub fn fail_role_lookups(&self, enabled: bool) {
        self.fail_role_lookups.store(enabled, Ordering::SeqCst);
    }

    /// Makes membership inserts fail with `StoreError::Unavailable`
    pub fn fail_membership_inserts(&self, enabled: bool) {
        self.fail_membership_inserts.store(enabled, Ordering::SeqCst);
    }

    pub async fn project_count(&self) -> usize {
        self.tables.read().await.projects.len()
    }

    pub async fn membership_count(&self) -> usize {
        self.tables.read().await.memberships.len()
    }

    pub async fn workboard_count(&self) -> usize {
        self.tables.read().await.workboards.len()
    }

    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| same_text(&u.email, &data.email)) {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::USERS_EMAIL_KEY.to_string(),
            });
        }
        if let Some(username) = data.username.as_deref() {
            let taken = tables
                .users
                .iter()
                .filter_map(|u| u.username.as_deref())
                .any(|existing| same_text(existing, username));
            if taken {
                return Err(StoreError::UniqueViolation {
                    constraint: constraints::USERS_USERNAME_KEY.to_string(),
                });
            }
        }

        let now = tables.now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            full_name: data.full_name,
            username: data.username,
            role: DEFAULT_ACCOUNT_ROLE.to_string(),
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| same_text(&u.email, email))
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username.as_deref().is_some_and(|n| same_text(n, username)))
            .cloned())
    }

    async fn record_login(&self, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.last_login_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        if self.fail_role_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("role lookup failed".to_string()));
        }

        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn create_project_with_owner(
        &self,
        data: CreateProject,
        owner_id: Uuid,
        role_id: Uuid,
    ) -> StoreResult<(Project, Membership)> {
        let mut tables = self.tables.write().await;

        if data.name.trim().is_empty() {
            return Err(check(constraints::PROJECTS_NAME_NOT_BLANK));
        }

        let now = tables.now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status: ProjectStatus::default().as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());

        let inserted = if self.fail_membership_inserts.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("membership insert failed".to_string()))
        } else {
            tables.insert_membership(CreateMembership {
                user_id: owner_id,
                project_id: project.id,
                role_id,
            })
        };

        match inserted {
            Ok(membership) => Ok((project, membership)),
            Err(err) => {
                tables.projects.retain(|p| p.id != project.id);
                Err(err)
            }
        }
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.projects.iter().find(|p| p.id == m.project_id))
            .cloned()
            .collect();

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership> {
        if self.fail_membership_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("membership insert failed".to_string()));
        }

        let mut tables = self.tables.write().await;
        tables.insert_membership(data)
    }

    async fn find_membership_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .and_then(|m| tables.roles.iter().find(|r| r.id == m.role_id))
            .cloned())
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>> {
        let tables = self.tables.read().await;
        let mut members: Vec<(Uuid, ProjectMember)> = tables
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .filter_map(|m| {
                let user = tables.users.iter().find(|u| u.id == m.user_id)?;
                let role = tables.roles.iter().find(|r| r.id == m.role_id)?;
                Some((
                    m.id,
                    ProjectMember {
                        user_id: user.id,
                        email: user.email.clone(),
                        full_name: user.full_name.clone(),
                        username: user.username.clone(),
                        role_id: role.id,
                        role_name: role.name.clone(),
                        joined_at: m.created_at,
                    },
                ))
            })
            .collect();

        members.sort_by(|(a_id, a), (b_id, b)| a.joined_at.cmp(&b.joined_at).then(a_id.cmp(b_id)));
        Ok(members.into_iter().map(|(_, member)| member).collect())
    }

    async fn create_workboard(&self, data: CreateWorkboard) -> StoreResult<Workboard> {
        let mut tables = self.tables.write().await;

        if !tables.projects.iter().any(|p| p.id == data.project_id) {
            return Err(fk(constraints::WORKBOARDS_PROJECT_ID_FKEY));
        }
        if data.name.trim().is_empty() {
            return Err(check(constraints::WORKBOARDS_NAME_NOT_BLANK));
        }

        let now = tables.now();
        let workboard = Workboard {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            name: data.name,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        tables.workboards.push(workboard.clone());
        Ok(workboard)
    }

    async fn find_workboard(&self, id: Uuid) -> StoreResult<Option<Workboard>> {
        let tables = self.tables.read().await;
        Ok(tables.workboards.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workboards(&self, project_id: Uuid) -> StoreResult<Vec<Workboard>> {
        let tables = self.tables.read().await;
        let mut workboards: Vec<Workboard> = tables
            .workboards
            .iter()
            .filter(|w| w.project_id == project_id)
            .cloned()
            .collect();

        workboards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(workboards)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.workboards.iter().any(|w| w.id == data.workboard_id) {
            return Err(fk(constraints::TASKS_WORKBOARD_ID_FKEY));
        }
        if data.title.trim().is_empty() {
            return Err(check(constraints::TASKS_TITLE_NOT_BLANK));
        }

        let now = tables.now();
        let task = Task {
            id: Uuid::new_v4(),
            workboard_id: data.workboard_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, workboard_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| t.workboard_id == workboard_id)
            .cloned()
            .collect();

        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn create_session(&self, data: CreateSession) -> StoreResult<Session> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == data.user_id) {
            return Err(fk(constraints::SESSIONS_USER_ID_FKEY));
        }

        let session = Session {
            id: data.id,
            user_id: data.user_id,
            refresh_token_hash: data.refresh_token_hash,
            created_at: tables.now(),
            expires_at: data.expires_at,
            revoked_at: None,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        match tables
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.revoked_at.is_none())
        {
            Some(session) => {
                session.revoked_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
