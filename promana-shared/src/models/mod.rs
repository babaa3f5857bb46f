/// Database models for Pro Mana
///
/// Each model owns the SQL for its table. Query functions are generic over
/// `sqlx::PgExecutor`, so they run equally against the pool or inside a
/// transaction.
///
/// # Models
///
/// - `user`: Accounts, credentials and public profiles
/// - `role`: Role catalogue and project permission levels
/// - `project`: Projects and membership-scoped listing
/// - `membership`: `user_roles` rows binding users to projects
/// - `workboard`: Task groupings within a project
/// - `task`: Tasks within a workboard
/// - `session`: Server-side login sessions

pub mod membership;
pub mod project;
pub mod role;
pub mod session;
pub mod task;
pub mod user;
pub mod workboard;
