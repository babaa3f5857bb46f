/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: Access and refresh tokens bound to a session
/// - [`context`]: The authenticated caller
/// - [`authorization`]: Membership-based project permissions
///
/// # Example
///
/// ```no_run
/// use promana_shared::auth::jwt::{create_token, Claims, TokenType};
/// use promana_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Password123")?;
/// assert!(verify_password("Password123", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "a-secret-key-of-at-least-32-bytes!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod context;
pub mod jwt;
pub mod password;
