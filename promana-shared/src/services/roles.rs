/// Role lookup by name
///
/// The lookup never fails outright: a missing row and a failed query are
/// both values the caller decides how to present.

use uuid::Uuid;

use crate::store::Store;

/// Outcome of resolving a role name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleLookup {
    Found(Uuid),

    /// No role with that name exists
    NotFound,

    /// The store could not answer; carries the error text
    TransientFailure(String),
}

impl RoleLookup {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            RoleLookup::Found(id) => Some(*id),
            _ => None,
        }
    }
}

/// Resolves a role name to its ID
///
/// Blank names resolve to `NotFound` without querying the store.
pub async fn resolve_role(store: &dyn Store, role_name: &str) -> RoleLookup {
    let role_name = role_name.trim();
    if role_name.is_empty() {
        return RoleLookup::NotFound;
    }

    match store.find_role_by_name(role_name).await {
        Ok(Some(role)) => RoleLookup::Found(role.id),
        Ok(None) => {
            tracing::warn!(role = role_name, "Role not found");
            RoleLookup::NotFound
        }
        Err(err) => {
            tracing::warn!(role = role_name, error = %err, "Error fetching role ID");
            RoleLookup::TransientFailure(err.to_string())
        }
    }
}
