/// HTTP client for the Pro Mana API
///
/// Every create operation validates its input locally first and holds a
/// per-operation [`InFlight`] flag while the request is pending. Sign-in,
/// sign-up and sign-out update the shared [`SessionContext`].
///
/// # Example
///
/// ```no_run
/// use promana_client::{ProManaClient, Route};
/// use promana_shared::services::accounts::Credentials;
/// use promana_shared::services::projects::NewProject;
///
/// # async fn example() -> promana_client::ClientResult<()> {
/// let client = ProManaClient::new("http://localhost:8080")?;
/// client
///     .sign_in(Credentials {
///         email: "alice@example.com".to_string(),
///         password: "Secret123".to_string(),
///     })
///     .await?;
///
/// let created = client
///     .create_project(NewProject {
///         name: "Launch Plan".to_string(),
///         description: None,
///     })
///     .await?;
/// assert!(matches!(created.route, Route::Project(_)));
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use promana_shared::auth::password::validate_password_strength;
use promana_shared::models::membership::ProjectMember;
use promana_shared::models::project::Project;
use promana_shared::models::task::Task;
use promana_shared::models::user::UserProfile;
use promana_shared::models::workboard::Workboard;
use promana_shared::services::accounts::{
    AccessToken, AuthSession, Credentials, Registration, UsernameAvailability,
};
use promana_shared::services::members::NewMember;
use promana_shared::services::projects::NewProject;
use promana_shared::services::tasks::NewTask;
use promana_shared::services::workboards::NewWorkboard;
use promana_shared::services::{field_errors, FieldError};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ClientError, ClientResult, ErrorBody};
use crate::inflight::InFlight;
use crate::routes::{Navigation, Route};
use crate::session::{SessionContext, SessionUser};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ProManaClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
    creating_project: InFlight,
    creating_workboard: InFlight,
    creating_task: InFlight,
    adding_member: InFlight,
}

fn check<T: Validate>(input: &T) -> ClientResult<()> {
    input
        .validate()
        .map_err(|errors| ClientError::Validation(field_errors(&errors)))
}

impl ProManaClient {
    /// Client with a fresh session in the `Loading` state
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_session(base_url, SessionContext::new(), DEFAULT_TIMEOUT)
    }

    pub fn with_session(
        base_url: impl Into<String>,
        session: SessionContext,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            session,
            creating_project: InFlight::new(),
            creating_workboard: InFlight::new(),
            creating_task: InFlight::new(),
            adding_member: InFlight::new(),
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self
            .session
            .access_token()
            .ok_or(ClientError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    /// Converts an error response; `sent_session` marks calls that carried
    /// the session's own tokens, whose 401 ends the local session
    async fn error_from(&self, response: Response, sent_session: bool) -> ClientError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();

        if sent_session && status == StatusCode::UNAUTHORIZED && self.session.is_authenticated() {
            tracing::info!("Server rejected the session; signing out locally");
            self.session.sign_out();
        }

        let message = if body.message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            body.message
        };

        ClientError::Api {
            status: status.as_u16(),
            code: body.error,
            message,
            details: body.details.unwrap_or_default(),
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(self.error_from(response, true).await);
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.authed(self.http.get(self.url(path)))?;
        self.send(builder).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        let builder = self.authed(self.http.post(self.url(path)))?.json(body);
        self.send(builder).await
    }

    // Session

    /// Resolves the startup `Loading` state from previously stored tokens
    ///
    /// With no tokens, or tokens the server no longer accepts, the session
    /// becomes anonymous.
    pub async fn resume(&self, stored: Option<(String, String)>) -> ClientResult<Route> {
        let Some((access_token, refresh_token)) = stored else {
            self.session.sign_out();
            return Ok(Route::Login);
        };

        let response = self
            .http
            .get(self.url("/v1/auth/session"))
            .bearer_auth(&access_token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.sign_out();
            return Ok(Route::Login);
        }
        if !response.status().is_success() {
            let err = self.error_from(response, false).await;
            self.session.sign_out();
            return Err(err);
        }

        let profile: UserProfile = response.json().await?;
        self.session.sign_in(SessionUser {
            profile,
            access_token,
            refresh_token,
        });
        Ok(Route::Dashboard)
    }

    pub async fn sign_up(&self, input: Registration) -> ClientResult<Navigation<UserProfile>> {
        let input = input.normalized();
        check(&input)?;
        validate_password_strength(&input.password)
            .map_err(|msg| ClientError::Validation(vec![FieldError::new("password", msg)]))?;

        let response = self
            .http
            .post(self.url("/v1/auth/register"))
            .json(&input)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false).await);
        }

        let auth: AuthSession = response.json().await?;
        Ok(self.start_session(auth))
    }

    pub async fn sign_in(&self, input: Credentials) -> ClientResult<Navigation<UserProfile>> {
        let input = input.normalized();
        check(&input)?;

        let response = self
            .http
            .post(self.url("/v1/auth/login"))
            .json(&input)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false).await);
        }

        let auth: AuthSession = response.json().await?;
        Ok(self.start_session(auth))
    }

    fn start_session(&self, auth: AuthSession) -> Navigation<UserProfile> {
        let profile = auth.user.clone();
        self.session.sign_in(SessionUser::new(auth.user, auth.tokens));
        Navigation::new(profile, Route::Dashboard)
    }

    /// Ends the session on the server and locally
    ///
    /// The local session is cleared even when the server call fails.
    pub async fn sign_out(&self) -> ClientResult<Route> {
        let result = match self.authed(self.http.post(self.url("/v1/auth/logout"))) {
            Ok(builder) => match builder.send().await {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(self.error_from(response, true).await),
                Err(err) => Err(err.into()),
            },
            Err(ClientError::NotAuthenticated) => Ok(()),
            Err(err) => Err(err),
        };

        self.session.sign_out();

        if let Err(err) = &result {
            tracing::warn!(error = %err, "Server sign-out failed");
        }
        result.map(|_| Route::Login)
    }

    /// Trades the refresh token for a new access token
    pub async fn refresh(&self) -> ClientResult<()> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(ClientError::NotAuthenticated)?;

        let response = self
            .http
            .post(self.url("/v1/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.error_from(response, true).await);
        }

        let token: AccessToken = response.json().await?;
        self.session.replace_access_token(token.access_token);
        Ok(())
    }

    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        self.get("/v1/auth/session").await
    }

    /// Blank usernames are answered locally without a request
    pub async fn check_username(&self, username: &str) -> ClientResult<UsernameAvailability> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(UsernameAvailability {
                available: false,
                message: "Username is required.".to_string(),
            });
        }

        let response = self
            .http
            .get(self.url("/v1/auth/check-username"))
            .query(&[("username", username)])
            .send()
            .await?;

        if response.status().is_success() || response.status() == StatusCode::BAD_REQUEST {
            Ok(response.json().await?)
        } else {
            Err(self.error_from(response, false).await)
        }
    }

    // Projects

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.get("/v1/projects").await
    }

    pub async fn get_project(&self, project_id: Uuid) -> ClientResult<Project> {
        self.get(&format!("/v1/projects/{}", project_id)).await
    }

    /// Creates a project and routes to its page
    pub async fn create_project(&self, input: NewProject) -> ClientResult<Navigation<Project>> {
        check(&input)?;
        let _guard = self
            .creating_project
            .try_begin()
            .ok_or(ClientError::AlreadyInFlight("Project creation"))?;

        let project: Project = self.post("/v1/projects", &input).await?;
        let route = Route::Project(project.id);
        Ok(Navigation::new(project, route))
    }

    pub async fn list_members(&self, project_id: Uuid) -> ClientResult<Vec<ProjectMember>> {
        self.get(&format!("/v1/projects/{}/members", project_id))
            .await
    }

    pub async fn add_member(&self, project_id: Uuid, input: NewMember) -> ClientResult<ProjectMember> {
        check(&input)?;
        let _guard = self
            .adding_member
            .try_begin()
            .ok_or(ClientError::AlreadyInFlight("Adding a member"))?;

        self.post(&format!("/v1/projects/{}/members", project_id), &input)
            .await
    }

    // Workboards

    pub async fn list_workboards(&self, project_id: Uuid) -> ClientResult<Vec<Workboard>> {
        self.get(&format!("/v1/projects/{}/workboards", project_id))
            .await
    }

    pub async fn get_workboard(&self, workboard_id: Uuid) -> ClientResult<Workboard> {
        self.get(&format!("/v1/workboards/{}", workboard_id)).await
    }

    /// Creates a workboard and routes to it
    pub async fn create_workboard(
        &self,
        project_id: Uuid,
        input: NewWorkboard,
    ) -> ClientResult<Navigation<Workboard>> {
        check(&input)?;
        let _guard = self
            .creating_workboard
            .try_begin()
            .ok_or(ClientError::AlreadyInFlight("Workboard creation"))?;

        let board: Workboard = self
            .post(&format!("/v1/projects/{}/workboards", project_id), &input)
            .await?;
        let route = Route::Workboard {
            project_id: board.project_id,
            workboard_id: board.id,
        };
        Ok(Navigation::new(board, route))
    }

    // Tasks

    pub async fn list_tasks(&self, workboard_id: Uuid) -> ClientResult<Vec<Task>> {
        self.get(&format!("/v1/workboards/{}/tasks", workboard_id))
            .await
    }

    pub async fn create_task(&self, workboard_id: Uuid, input: NewTask) -> ClientResult<Task> {
        check(&input)?;
        let _guard = self
            .creating_task
            .try_begin()
            .ok_or(ClientError::AlreadyInFlight("Task creation"))?;

        self.post(&format!("/v1/workboards/{}/tasks", workboard_id), &input)
            .await
    }
}
