/// Identity of an authenticated request

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Who is calling, established from a validated access token whose session
/// is still active
///
/// The API's auth middleware puts this into request extensions; handlers
/// take it with `Extension<AuthContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid, session_id: Uuid) -> Self {
        Self {
            user_id,
            session_id,
        }
    }
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.sid)
    }
}
