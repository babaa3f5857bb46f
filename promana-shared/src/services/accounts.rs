/// Account and session operations
///
/// Registration and login both open a server-side session and return a
/// token pair bound to it. The refresh token is stored only as a digest;
/// revoking the session on logout invalidates both tokens.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{not_blank, optional_text, validate_input, FieldError, ServiceError, ServiceResult};
use crate::auth::context::AuthContext;
use crate::auth::jwt::{self, Claims, TokenType};
use crate::auth::password;
use crate::models::session::{hash_refresh_token, CreateSession};
use crate::models::user::{CreateUser, UserProfile};
use crate::store::Store;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const SESSION_ENDED: &str = "Session has expired or was revoked";

/// Usernames: 3 to 30 letters, digits, `_`, `-` or `.`
pub fn valid_username(value: &str) -> Result<(), ValidationError> {
    let length_ok = (3..=30).contains(&value.chars().count());
    let chars_ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if length_ok && chars_ok {
        return Ok(());
    }

    let mut err = ValidationError::new("username");
    err.message = Some(
        "Username must be 3-30 characters of letters, digits, '_', '-' or '.'".into(),
    );
    Err(err)
}

/// Sign-up form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Registration {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Full name must be at most 255 characters")
    )]
    pub full_name: String,

    #[serde(default)]
    #[validate(custom(function = "valid_username"))]
    pub username: Option<String>,
}

/// Sign-in form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl Registration {
    /// Trims the email and drops a blank username
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self.username = optional_text(self.username);
        self
    }
}

impl Credentials {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self
    }
}

/// Token pair for a new session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Result of a successful sign-up or sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: UserProfile,

    #[serde(flatten)]
    pub tokens: SessionTokens,
}

/// A fresh access token for an existing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameAvailability {
    pub available: bool,
    pub message: String,
}

async fn open_session(
    store: &dyn Store,
    secret: &str,
    user_id: Uuid,
) -> ServiceResult<SessionTokens> {
    let session_id = Uuid::new_v4();
    let access = Claims::new(user_id, session_id, TokenType::Access);
    let refresh = Claims::new(user_id, session_id, TokenType::Refresh);

    let access_token = jwt::create_token(&access, secret)?;
    let refresh_token = jwt::create_token(&refresh, secret)?;

    store
        .create_session(CreateSession {
            id: session_id,
            user_id,
            refresh_token_hash: hash_refresh_token(&refresh_token),
            expires_at: Utc::now() + TokenType::Refresh.default_expiration(),
        })
        .await?;

    Ok(SessionTokens {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in_seconds(),
    })
}

/// Creates an account and signs it in
///
/// # Errors
///
/// - `Validation` for malformed fields or a weak password
/// - `Conflict` when the email or username is taken
pub async fn register(
    store: &dyn Store,
    secret: &str,
    input: Registration,
) -> ServiceResult<AuthSession> {
    let input = input.normalized();
    validate_input(&input)?;

    password::validate_password_strength(&input.password)
        .map_err(|msg| ServiceError::Validation(vec![FieldError::new("password", msg)]))?;

    let password_hash = password::hash_password(&input.password)?;

    let user = store
        .create_user(CreateUser {
            email: input.email,
            full_name: input.full_name.trim().to_string(),
            username: input.username,
            password_hash,
        })
        .await?;

    let tokens = open_session(store, secret, user.id).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(AuthSession {
        user: UserProfile::from(&user),
        tokens,
    })
}

/// Signs in with email and password
pub async fn login(
    store: &dyn Store,
    secret: &str,
    input: Credentials,
) -> ServiceResult<AuthSession> {
    let input = input.normalized();
    validate_input(&input)?;

    let user = store
        .find_user_by_email(&input.email)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&input.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    store.record_login(user.id).await?;
    let tokens = open_session(store, secret, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(AuthSession {
        user: UserProfile::from(&user),
        tokens,
    })
}

/// Exchanges a refresh token for a new access token on the same session
pub async fn refresh(
    store: &dyn Store,
    secret: &str,
    refresh_token: &str,
) -> ServiceResult<AccessToken> {
    let claims = jwt::validate_refresh_token(refresh_token, secret)?;

    let session = store
        .find_session(claims.sid)
        .await?
        .filter(|s| {
            s.user_id == claims.sub
                && s.is_active_at(Utc::now())
                && s.matches_refresh_token(refresh_token)
        })
        .ok_or_else(|| ServiceError::Unauthorized(SESSION_ENDED.to_string()))?;

    let access = Claims::new(session.user_id, session.id, TokenType::Access);

    Ok(AccessToken {
        access_token: jwt::create_token(&access, secret)?,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in_seconds(),
    })
}

/// Resolves an access token to the caller, rejecting ended sessions
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    access_token: &str,
) -> ServiceResult<AuthContext> {
    let claims = jwt::validate_access_token(access_token, secret)?;

    let active = store
        .find_session(claims.sid)
        .await?
        .is_some_and(|s| s.user_id == claims.sub && s.is_active_at(Utc::now()));

    if !active {
        return Err(ServiceError::Unauthorized(SESSION_ENDED.to_string()));
    }

    Ok(AuthContext::from(&claims))
}

/// Ends the caller's session
pub async fn logout(store: &dyn Store, auth: &AuthContext) -> ServiceResult<()> {
    let revoked = store.revoke_session(auth.session_id).await?;

    tracing::info!(
        user_id = %auth.user_id,
        session_id = %auth.session_id,
        revoked,
        "User logged out"
    );

    Ok(())
}

/// Profile of the signed-in user
pub async fn current_user(store: &dyn Store, auth: &AuthContext) -> ServiceResult<UserProfile> {
    let user = store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("User no longer exists".to_string()))?;

    Ok(UserProfile::from(&user))
}

/// Whether a username can still be registered
pub async fn check_username(
    store: &dyn Store,
    username: Option<&str>,
) -> ServiceResult<UsernameAvailability> {
    let username = username.map(str::trim).unwrap_or_default();
    if username.is_empty() {
        return Err(ServiceError::BadRequest("Username is required.".to_string()));
    }

    let taken = store.find_user_by_username(username).await?.is_some();

    Ok(if taken {
        UsernameAvailability {
            available: false,
            message: "Username is already taken.".to_string(),
        }
    } else {
        UsernameAvailability {
            available: true,
            message: "Username is available.".to_string(),
        }
    })
}
