/// Business operations
///
/// Each operation validates its input before touching the store, checks the
/// caller's project permissions, and then performs the reads and writes.
/// Failures come back as [`ServiceError`], which the API maps onto HTTP
/// statuses.
///
/// # Modules
///
/// - [`roles`]: Role lookup by name
/// - [`projects`]: Create, list and fetch projects
/// - [`members`]: List and add project members
/// - [`workboards`]: Create, list and fetch workboards
/// - [`tasks`]: Create and list tasks
/// - [`accounts`]: Registration, login, sessions and username checks

pub mod accounts;
pub mod members;
pub mod projects;
pub mod roles;
pub mod tasks;
pub mod workboards;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::{constraints, StoreError};

/// Message shown when the admin role row is missing
pub const ADMIN_ROLE_MISSING: &str = "Admin role not found. Please contact support.";

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before any store access
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Malformed request outside field validation
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The `admin` role row does not exist
    #[error("{}", ADMIN_ROLE_MISSING)]
    RoleNotFound,

    /// The store could not be reached; nothing was written
    #[error("{0}")]
    Unavailable(String),

    /// Unexpected failure; details are for logs only
    #[error("{0}")]
    Internal(String),
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                let message = match constraint.as_str() {
                    constraints::USERS_EMAIL_KEY => "Email is already registered",
                    constraints::USERS_USERNAME_KEY => "Username is already taken.",
                    constraints::USER_ROLES_USER_PROJECT_KEY => {
                        "User is already a member of this project"
                    }
                    _ => "Resource already exists",
                };
                ServiceError::Conflict(message.to_string())
            }
            StoreError::ForeignKeyViolation { constraint } => {
                let message = match constraint.as_str() {
                    constraints::WORKBOARDS_PROJECT_ID_FKEY
                    | constraints::USER_ROLES_PROJECT_ID_FKEY => "Project not found",
                    constraints::TASKS_WORKBOARD_ID_FKEY => "Workboard not found",
                    constraints::USER_ROLES_USER_ID_FKEY | constraints::SESSIONS_USER_ID_FKEY => {
                        "User not found"
                    }
                    constraints::USER_ROLES_ROLE_ID_FKEY => "Role not found",
                    _ => "Referenced resource not found",
                };
                ServiceError::NotFound(message.to_string())
            }
            StoreError::CheckViolation { constraint } => {
                let field = match constraint.as_str() {
                    constraints::TASKS_TITLE_NOT_BLANK => "title",
                    _ => "name",
                };
                ServiceError::Validation(vec![FieldError::new(field, REQUIRED_MESSAGE)])
            }
            StoreError::Unavailable(msg) => ServiceError::Unavailable(format!(
                "Storage is temporarily unavailable: {}",
                msg
            )),
            StoreError::Database(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) => {
                ServiceError::Forbidden("You are not a member of this project".to_string())
            }
            AuthzError::InsufficientRole { required, .. } => ServiceError::Forbidden(format!(
                "This action requires the {} role",
                required.as_str()
            )),
            AuthzError::Store(err) => err.into(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            JwtError::Expired => ServiceError::Unauthorized("Token expired".to_string()),
            other => ServiceError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

const REQUIRED_MESSAGE: &str = "This field is required";

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed(REQUIRED_MESSAGE));
        return Err(err);
    }
    Ok(())
}

/// Runs `validator` rules and flattens failures into [`FieldError`]s,
/// sorted by field name
pub fn validate_input<T: Validate>(input: &T) -> ServiceResult<()> {
    input
        .validate()
        .map_err(|errors| ServiceError::Validation(field_errors(&errors)))
}

/// Flattens `validator` failures into [`FieldError`]s sorted by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                FieldError::new(
                    field.to_string(),
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                )
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Trims an optional text field, dropping it when blank
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
