use std::cell::{Cell, RefCell};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::RefreshPolicy;

/// Result of asking the identity provider to extend the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRefresh {
    /// Whether the provider actually minted a new token.
    pub refreshed: bool,
    pub token: String,
}

/// The identity provider the page authenticates against (a Keycloak adapter in the
/// browser). Futures are not `Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait IdentityProvider {
    type Error: std::fmt::Display;

    /// Runs the interactive login flow and returns the access token.
    async fn login(&self) -> Result<String, Self::Error>;
    /// Extends the session when fewer than `min_validity_seconds` of validity remain.
    async fn update_token(&self, min_validity_seconds: u32) -> Result<TokenRefresh, Self::Error>;
    fn clear_token(&self);
    fn logout(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Authenticating,
    Authenticated { access_token: String },
    LoggedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Changed(String),
    Unchanged,
    Failed,
    /// No session to refresh.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("session is already {0}")]
    AlreadyStarted(&'static str),
    #[error("login returned an empty access token")]
    EmptyToken,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub refresh_attempts: u64,
    pub refresh_changes: u64,
    pub refresh_failures: u64,
    pub consecutive_failures: u32,
}

pub struct SessionManager<P> {
    provider: P,
    policy: RefreshPolicy,
    state: RefCell<SessionState>,
    stats: Cell<SessionStats>,
}

impl<P: IdentityProvider> SessionManager<P> {
    pub fn new(provider: P, policy: RefreshPolicy) -> Self {
        Self {
            provider,
            policy,
            state: RefCell::new(SessionState::Uninitialized),
            stats: Cell::new(SessionStats::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A copy of the current access token, if authenticated.
    pub fn access_token(&self) -> Option<String> {
        match &*self.state.borrow() {
            SessionState::Authenticated { access_token } => Some(access_token.clone()),
            _ => None,
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.get()
    }

    pub async fn init(&self) -> Result<String, SessionError> {
        {
            let mut state = self.state.borrow_mut();
            match *state {
                SessionState::Uninitialized => *state = SessionState::Authenticating,
                SessionState::Authenticating => {
                    return Err(SessionError::AlreadyStarted("authenticating"));
                }
                SessionState::Authenticated { .. } => {
                    return Err(SessionError::AlreadyStarted("authenticated"));
                }
                SessionState::LoggedOut => return Err(SessionError::AlreadyStarted("logged out")),
            }
        }

        let token = match self.provider.login().await {
            Ok(token) if token.trim().is_empty() => Err(SessionError::EmptyToken),
            Ok(token) => Ok(token),
            Err(error) => Err(SessionError::LoginFailed(error.to_string())),
        };

        match token {
            Ok(token) => {
                tracing::info!("session authenticated");
                *self.state.borrow_mut() = SessionState::Authenticated {
                    access_token: token.clone(),
                };
                Ok(token)
            }
            Err(error) => {
                tracing::error!(error = %error, "session login failed");
                *self.state.borrow_mut() = SessionState::Uninitialized;
                Err(error)
            }
        }
    }

    /// One refresh attempt. Failures clear the session and are otherwise absorbed.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(previous) = self.access_token() else {
            return RefreshOutcome::Skipped;
        };

        let mut stats = self.stats.get();
        stats.refresh_attempts = stats.refresh_attempts.saturating_add(1);

        let result = self
            .provider
            .update_token(self.policy.min_validity_seconds)
            .await;

        // A logout may have landed while the provider was busy.
        if self.access_token().is_none() {
            self.stats.set(stats);
            return RefreshOutcome::Skipped;
        }

        let outcome = match result {
            Ok(TokenRefresh { refreshed: true, token }) if token != previous => {
                stats.refresh_changes = stats.refresh_changes.saturating_add(1);
                stats.consecutive_failures = 0;
                *self.state.borrow_mut() = SessionState::Authenticated {
                    access_token: token.clone(),
                };
                tracing::debug!("access token refreshed");
                RefreshOutcome::Changed(token)
            }
            Ok(_) => {
                stats.consecutive_failures = 0;
                RefreshOutcome::Unchanged
            }
            Err(error) => {
                stats.refresh_failures = stats.refresh_failures.saturating_add(1);
                stats.consecutive_failures = stats.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    error = %error,
                    consecutive_failures = stats.consecutive_failures,
                    "token refresh failed; clearing session"
                );
                self.provider.clear_token();
                *self.state.borrow_mut() = SessionState::LoggedOut;
                RefreshOutcome::Failed
            }
        };
        self.stats.set(stats);
        outcome
    }

    /// Refreshes once right away and then after every `policy.interval`, handing each
    /// changed token to `on_refreshed`. Never returns; `sleep` supplies the timer.
    pub async fn keep_fresh<S, Fut, F>(&self, mut sleep: S, mut on_refreshed: F)
    where
        S: FnMut(Duration) -> Fut,
        Fut: Future<Output = ()>,
        F: FnMut(String),
    {
        loop {
            if let RefreshOutcome::Changed(token) = self.refresh().await {
                on_refreshed(token);
            }
            sleep(self.policy.interval).await;
        }
    }

    pub fn logout(&self) {
        tracing::info!("logging out");
        *self.state.borrow_mut() = SessionState::LoggedOut;
        self.provider.logout();
    }
}
