/// Client-side session state and the auth gate
///
/// [`SessionContext`] is created at startup in the `Loading` state, moves to
/// `Authenticated` on sign-in or sign-up, and back to `Anonymous` on
/// sign-out or when the server rejects the session. Views subscribe to it
/// and ask [`AuthGate`] what to show.

use std::sync::Arc;

use promana_shared::models::user::UserProfile;
use promana_shared::services::accounts::SessionTokens;
use tokio::sync::watch;

use crate::routes::Route;

/// The signed-in user and the tokens of their session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub profile: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionUser {
    pub fn new(profile: UserProfile, tokens: SessionTokens) -> Self {
        Self {
            profile,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup; the stored session has not been checked yet
    Loading,
    Anonymous,
    Authenticated(SessionUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// What a protected view should do for the current session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGate {
    Render(SessionUser),
    Wait,
    Redirect(Route),
}

impl AuthGate {
    pub fn for_state(state: &SessionState) -> Self {
        match state {
            SessionState::Loading => AuthGate::Wait,
            SessionState::Anonymous => AuthGate::Redirect(Route::Login),
            SessionState::Authenticated(user) => AuthGate::Render(user.clone()),
        }
    }
}

/// Observable session shared by everything that talks to the API
///
/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Loading);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::for_state(&self.state.borrow())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().user().map(|u| u.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().user().map(|u| u.refresh_token.clone())
    }

    pub fn sign_in(&self, user: SessionUser) {
        tracing::debug!(user_id = %user.profile.id, "Session started");
        self.state.send_replace(SessionState::Authenticated(user));
    }

    /// Drops the session; also resolves `Loading` when nothing was stored
    pub fn sign_out(&self) {
        let previous = self.state.send_replace(SessionState::Anonymous);
        if let SessionState::Authenticated(user) = previous {
            tracing::debug!(user_id = %user.profile.id, "Session ended");
        }
    }

    /// Swaps in a refreshed access token; no-op when signed out
    pub fn replace_access_token(&self, access_token: String) {
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(user) => {
                user.access_token = access_token;
                true
            }
            _ => false,
        });
    }

    /// Waits until the state is no longer `Loading`
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.subscribe();
        let state = match rx
            .wait_for(|state| !matches!(state, SessionState::Loading))
            .await
        {
            Ok(state) => state.clone(),
            // Sender is owned by self, so it cannot close while we wait
            Err(_) => self.state(),
        };
        state
    }
}
