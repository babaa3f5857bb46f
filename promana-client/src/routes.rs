/// Application routes the client navigates between

use std::fmt;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Login,
    Project(Uuid),
    Workboard { project_id: Uuid, workboard_id: Uuid },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/dashboard".to_string(),
            Route::Login => "/login".to_string(),
            Route::Project(id) => format!("/project/{}", id),
            Route::Workboard {
                project_id,
                workboard_id,
            } => format!("/project/{}/workboard/{}", project_id, workboard_id),
        }
    }

    /// Whether the route needs a signed-in user
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A successful result together with where to go next
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation<T> {
    pub value: T,
    pub route: Route,
}

impl<T> Navigation<T> {
    pub fn new(value: T, route: Route) -> Self {
        Self { value, route }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let project_id = Uuid::new_v4();
        let workboard_id = Uuid::new_v4();

        assert_eq!(Route::Dashboard.path(), "/dashboard");
        assert_eq!(Route::Login.to_string(), "/login");
        assert_eq!(
            Route::Project(project_id).path(),
            format!("/project/{}", project_id)
        );
        assert_eq!(
            Route::Workboard {
                project_id,
                workboard_id
            }
            .path(),
            format!("/project/{}/workboard/{}", project_id, workboard_id)
        );
    }

    #[test]
    fn test_only_login_is_public() {
        assert!(!Route::Login.requires_auth());
        assert!(Route::Dashboard.requires_auth());
        assert!(Route::Project(Uuid::new_v4()).requires_auth());
    }
}
