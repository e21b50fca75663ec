//! Auth gate
//!
//! The signed-in session is an explicit context object owned by whoever
//! drives navigation. It is created by a successful login and dropped on
//! logout; the capture and gallery flows are only reachable while it exists.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub use client::AuthClient;

/// Message shown when a login fails without a server explanation
pub const LOGIN_FAILED: &str = "Login failed";
/// Message shown when a registration fails without a server explanation
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// The signed-in user as reported by the remote authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Identity plus the bearer token issued with it
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Identity,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A failed auth exchange, carrying the message to show the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The remote authority: one request, one answer, no retries
#[async_trait]
pub trait AuthAuthority: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Returns the server's confirmation message
    async fn register(&self, registration: &Registration) -> Result<String, AuthError>;
}

/// Holds the current session, if any
pub struct AuthGate {
    authority: Arc<dyn AuthAuthority>,
    session: Option<Session>,
}

impl AuthGate {
    pub fn new(authority: Arc<dyn AuthAuthority>) -> Self {
        Self {
            authority,
            session: None,
        }
    }

    pub fn current_user(&self) -> Option<&Identity> {
        self.session.as_ref().map(|session| &session.user)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Log in and keep the session. A failed login leaves any prior state alone.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, AuthError> {
        let session = self.authority.login(credentials).await?;
        info!("🔑 Signed in as {}", session.user.username);
        Ok(&*self.session.insert(session))
    }

    pub async fn register(&self, registration: &Registration) -> Result<String, AuthError> {
        self.authority.register(registration).await
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Signed out {}", session.user.username);
        }
    }
}
