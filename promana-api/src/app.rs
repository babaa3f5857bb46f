/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use promana_api::{app::{build_router, AppState}, config::Config};
/// use promana_shared::db::pool::{create_pool, DatabaseConfig};
/// use promana_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(config.database.url.clone())).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use promana_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::middleware::{
    auth::require_auth,
    security::{security_headers, SecurityPolicy},
};

/// Shared application state
///
/// Cloned into every handler through the `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   ├── GET  /check-username?username=
///     │   ├── POST /logout                     (auth)
///     │   └── GET  /session                    (auth)
///     ├── /projects                            (auth)
///     │   ├── GET, POST /
///     │   ├── GET       /:project_id
///     │   ├── GET, POST /:project_id/members
///     │   └── GET, POST /:project_id/workboards
///     └── /workboards                          (auth)
///         ├── GET       /:workboard_id
///         └── GET, POST /:workboard_id/tasks
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, then
/// authentication on the protected routes only.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/check-username", get(routes::auth::check_username));

    let protected_routes = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/session", get(routes::auth::session))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/:project_id", get(routes::projects::get_project))
        .route(
            "/projects/:project_id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/projects/:project_id/workboards",
            get(routes::workboards::list_workboards).post(routes::workboards::create_workboard),
        )
        .route(
            "/workboards/:workboard_id",
            get(routes::workboards::get_workboard),
        )
        .route(
            "/workboards/:workboard_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let v1_routes = public_routes.merge(protected_routes);

    let cors = cors_layer(&state.config);
    let security = SecurityPolicy::new(state.config.api.production);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(from_fn_with_state(security, security_headers))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, http::StatusCode};
    use promana_shared::store::MemoryStore;
    use tower::ServiceExt;

    fn app(config: Config) -> Router {
        build_router(AppState::new(Arc::new(MemoryStore::seeded()), config))
    }

    fn config() -> Config {
        Config::new("postgresql://unused", "test-secret-key-at-least-32-bytes-long")
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for uri in ["/v1/projects", "/v1/auth/session"] {
            let response = app(config())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = app(config())
            .oneshot(Request::builder().uri("/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_restricted_origins() {
        let mut config = config();
        config.api.cors_origins = vec!["https://app.example.com".to_string()];

        let response = app(config)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/v1/projects")
                    .header(header::ORIGIN, "https://app.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
    }
}
